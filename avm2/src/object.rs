//! The polymorphic runtime object (spec §4.3, §9's `ObjectKind` design note).
//!
//! The source dispatches `get_property`/`call`/`construct` through duck-typed
//! objects; here that becomes one `Object` handle (a cheap `Rc` clone) over a
//! `match` on [`ObjectKind`], exactly as §9 calls for. `Object` only carries
//! *data*: property storage, array/string backing, and the bits needed to
//! invoke a function or class. Accessor (getter/setter) dispatch and callable
//! invocation need the running VM, so those live in `crate::vm`/
//! `crate::interpreter`, not here — this module never calls back into the
//! executor.

use crate::method::BytecodeMethod;
use crate::namespace::Namespace;
use crate::property::{Property, PropertyKey, PropertyMap};
use crate::scope::ScopeChain;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A closure over a decoded method body: the method itself plus the scope
/// chain captured at the point the closure was created (`newfunction`,
/// `newclass`'s instance initializer, a trait's `Method`/`Getter`/`Setter`).
pub struct BytecodeFunction {
    pub method: Rc<BytecodeMethod>,
    pub scope: ScopeChain,
}

/// A host-supplied builtin. Host builtins in this system are leaf
/// functions: they do not call back into AVM2 bytecode (the host/runtime
/// class library is out of scope per spec §1), so the signature does not
/// need a VM handle.
pub type NativeFn = Rc<dyn Fn(Option<Value>, &[Value]) -> crate::error::Result<Value>>;

#[derive(Clone)]
pub enum FunctionKind {
    Bytecode(Rc<BytecodeFunction>),
    Native(NativeFn),
}

/// A `newclass`-produced class object (spec §4.5.1). `base_type` is an
/// index into the owning VM's class table, not an owned/`Gc` back-reference
/// (§9 design note): `ClassObject → base_type` would otherwise be a
/// reference cycle through the VM's class cache.
#[derive(Clone, Copy, Debug)]
pub struct ClassData {
    pub class_index: u32,
    pub base_type: Option<u32>,
}

pub enum ObjectKind {
    Plain,
    /// The global object a script's traits and top-level `var`s live on.
    Global,
    /// A `newactivation` object materializing a method's local scope.
    Activation,
    /// A `newcatch` object materializing one exception handler's catch
    /// variable.
    Catch,
    Array(Vec<Value>),
    /// A boxed `String` object, as opposed to the primitive `Value::String`.
    /// Not reachable from the bytecode this crate decodes (AS3 source never
    /// emits one without the `String` host class), kept for parity with the
    /// spec's "specialized variants" list.
    StringWrapper(Rc<str>),
    Function(FunctionKind),
    Class(ClassData),
}

impl fmt::Debug for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Plain => write!(f, "Plain"),
            ObjectKind::Global => write!(f, "Global"),
            ObjectKind::Activation => write!(f, "Activation"),
            ObjectKind::Catch => write!(f, "Catch"),
            ObjectKind::Array(elements) => write!(f, "Array(len={})", elements.len()),
            ObjectKind::StringWrapper(s) => write!(f, "StringWrapper({s:?})"),
            ObjectKind::Function(_) => write!(f, "Function"),
            ObjectKind::Class(c) => write!(f, "Class({c:?})"),
        }
    }
}

pub struct ObjectData {
    pub class: Option<u32>,
    properties: PropertyMap,
    /// Keys declared as class/script/activation traits at link time, as
    /// opposed to dynamic properties created later by assignment. The name
    /// resolver's scope-chain search discipline (spec §4.4) checks this set
    /// before falling back to dynamic lookup.
    declared: HashSet<PropertyKey>,
    pub kind: ObjectKind,
}

#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(f, "Object({:?}, {} properties)", data.kind, data.properties.len())
    }
}

impl Object {
    pub fn new(kind: ObjectKind, class: Option<u32>) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            class,
            properties: PropertyMap::new(),
            declared: HashSet::new(),
            kind,
        })))
    }

    pub fn new_plain(class: Option<u32>) -> Self {
        Self::new(ObjectKind::Plain, class)
    }

    pub fn new_global() -> Self {
        Self::new(ObjectKind::Global, None)
    }

    pub fn new_activation() -> Self {
        Self::new(ObjectKind::Activation, None)
    }

    pub fn new_catch() -> Self {
        Self::new(ObjectKind::Catch, None)
    }

    pub fn new_array(elements: Vec<Value>, class: Option<u32>) -> Self {
        Self::new(ObjectKind::Array(elements), class)
    }

    pub fn new_bytecode_function(method: Rc<BytecodeMethod>, scope: ScopeChain, class: Option<u32>) -> Self {
        Self::new(
            ObjectKind::Function(FunctionKind::Bytecode(Rc::new(BytecodeFunction { method, scope }))),
            class,
        )
    }

    pub fn new_native_function(f: NativeFn, class: Option<u32>) -> Self {
        Self::new(ObjectKind::Function(FunctionKind::Native(f)), class)
    }

    pub fn new_class(class_index: u32, base_type: Option<u32>) -> Self {
        Self::new(ObjectKind::Class(ClassData { class_index, base_type }), None)
    }

    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn class_index(&self) -> Option<u32> {
        self.0.borrow().class
    }

    pub fn with_kind<R>(&self, f: impl FnOnce(&ObjectKind) -> R) -> R {
        f(&self.0.borrow().kind)
    }

    pub fn as_class_data(&self) -> Option<ClassData> {
        match &self.0.borrow().kind {
            ObjectKind::Class(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_function_kind(&self) -> Option<FunctionKind> {
        match &self.0.borrow().kind {
            ObjectKind::Function(kind) => Some(kind.clone()),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Function(_) | ObjectKind::Class(_))
    }

    /// Declares a trait-backed property: written once at class/script/
    /// activation link time, visible to the resolver's strict "has_trait"
    /// check regardless of whether the scope is a `with` scope.
    pub fn declare_trait(&self, key: PropertyKey, prop: Property) {
        let mut data = self.0.borrow_mut();
        data.declared.insert(key.clone());
        data.properties.insert(key, prop);
    }

    pub fn has_trait(&self, key: &PropertyKey) -> bool {
        self.0.borrow().declared.contains(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.0.borrow().properties.contains(key)
    }

    /// Finds the first namespace in `namespaces` under which `name` is
    /// defined on this object's own property map (spec §4.4: "for each
    /// object, try each namespace in set order").
    pub fn find_key(&self, namespaces: &[Namespace], name: &str) -> Option<PropertyKey> {
        let data = self.0.borrow();
        namespaces.iter().find_map(|ns| {
            let key = PropertyKey::new(ns.uri.clone(), Rc::from(name));
            data.properties.contains(&key).then_some(key)
        })
    }

    pub fn property(&self, key: &PropertyKey) -> Option<Property> {
        self.0.borrow().properties.get(key).cloned()
    }

    pub fn set_slot(&self, key: PropertyKey, value: Value) {
        self.0.borrow_mut().properties.insert(key, Property::Slot(value));
    }

    /// Dynamic property creation (spec §4.5.3): always lands in the public
    /// namespace and is never marked as a declared trait.
    pub fn set_dynamic(&self, name: &str, value: Value) {
        self.set_slot(PropertyKey::dynamic(Rc::from(name)), value);
    }

    pub fn delete_property(&self, key: &PropertyKey) -> bool {
        let mut data = self.0.borrow_mut();
        if data.declared.contains(key) {
            return false;
        }
        data.properties.remove(key)
    }

    /// Indexed access for the array/string specializations (spec §4.3): a
    /// non-negative integer-looking name on an array or boxed string reads
    /// the backing sequence instead of the property map.
    pub fn indexed_get(&self, name: &str) -> Option<Value> {
        let index: usize = name.parse().ok()?;
        match &self.0.borrow().kind {
            ObjectKind::Array(elements) => Some(elements.get(index).cloned().unwrap_or(Value::Undefined)),
            ObjectKind::StringWrapper(s) => Some(
                s.chars()
                    .nth(index)
                    .map(|c| Value::from(c.to_string().as_str()))
                    .unwrap_or(Value::Undefined),
            ),
            _ => None,
        }
    }

    pub fn indexed_set(&self, name: &str, value: Value) -> bool {
        let index: usize = match name.parse() {
            Ok(i) => i,
            Err(_) => return false,
        };
        let mut data = self.0.borrow_mut();
        if let ObjectKind::Array(elements) = &mut data.kind {
            if index >= elements.len() {
                elements.resize(index + 1, Value::Undefined);
            }
            elements[index] = value;
            true
        } else {
            false
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match &self.0.borrow().kind {
            ObjectKind::Array(elements) => Some(elements.len()),
            _ => None,
        }
    }

    pub fn array_push(&self, value: Value) {
        if let ObjectKind::Array(elements) = &mut self.0.borrow_mut().kind {
            elements.push(value);
        }
    }

    /// Iterates declared and dynamic property keys in declaration order,
    /// the order `hasnext`/`nextname`/`nextvalue` enumerate (spec §4.5
    /// Iteration family).
    pub fn nth_property_key(&self, index: usize) -> Option<PropertyKey> {
        self.0.borrow().properties.nth_key(index).cloned()
    }

    pub fn property_count(&self) -> usize {
        self.0.borrow().properties.len()
    }

    pub fn to_avm_string(&self) -> Rc<str> {
        match &self.0.borrow().kind {
            ObjectKind::Array(_) => Rc::from("[object Array]"),
            ObjectKind::StringWrapper(s) => s.clone(),
            ObjectKind::Function(_) => Rc::from("function Function() {}"),
            ObjectKind::Class(_) => Rc::from("[class]"),
            _ => Rc::from("[object Object]"),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.0.borrow().kind {
            ObjectKind::Function(_) | ObjectKind::Class(_) => "function",
            _ => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_indexed_access_out_of_range_is_undefined() {
        let obj = Object::new_array(vec![Value::Int(1), Value::Int(2)], None);
        assert!(matches!(obj.indexed_get("0"), Some(Value::Int(1))));
        assert!(matches!(obj.indexed_get("5"), Some(Value::Undefined)));
    }

    #[test]
    fn declared_trait_survives_delete_attempt() {
        let obj = Object::new_plain(None);
        let key = PropertyKey::new("", "x");
        obj.declare_trait(key.clone(), Property::Slot(Value::Int(1)));
        assert!(!obj.delete_property(&key));
        assert!(obj.has_own_property(&key));
    }

    #[test]
    fn dynamic_property_can_be_deleted() {
        let obj = Object::new_plain(None);
        obj.set_dynamic("x", Value::Int(1));
        let key = PropertyKey::dynamic(Rc::from("x"));
        assert!(obj.delete_property(&key));
        assert!(!obj.has_own_property(&key));
    }
}
