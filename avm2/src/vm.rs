//! The VM executor (spec §4.6): program loading, method-environment
//! construction, and the public entry points an embedding host calls.

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::interpreter;
use crate::method::BytecodeMethod;
use crate::namespace::Namespace;
use crate::object::{ClassData, FunctionKind, NativeFn, Object, ObjectKind};
use crate::property::{Property, PropertyKey};
use crate::scope::{Scope, ScopeChain};
use crate::script::TranslationUnit;
use crate::value::Value;
use abc::{AbcFile, MethodFlags, TraitKind};
use fnv::FnvHashMap;
use std::rc::Rc;

/// The embedding host's built-in class library (spec §6 "Host registry").
/// Out of scope for this crate to implement; `Avm2` only calls into it when
/// a lookup misses the program's own instance table.
pub trait HostRegistry {
    fn resolve_class(&self, namespace: &str, name: &str) -> Option<Object>;
}

/// A registry with nothing registered, the default when an embedding host
/// doesn't need one (e.g. a program that only uses its own classes).
pub struct EmptyHostRegistry;

impl HostRegistry for EmptyHostRegistry {
    fn resolve_class(&self, _namespace: &str, _name: &str) -> Option<Object> {
        None
    }
}

pub struct Avm2 {
    unit: Rc<TranslationUnit>,
    global: Object,
    /// `newclass`-produced class objects, cached by class index for the
    /// program's lifetime (spec §3 "Class objects are created lazily... and
    /// cached by class index").
    class_objects: Vec<Option<Object>>,
    /// `qualified_name -> class_index`, built once at `load()` (spec §4.6).
    qname_to_class: FnvHashMap<(Rc<str>, Rc<str>), u32>,
    host: Rc<dyn HostRegistry>,
}

impl Avm2 {
    /// Decodes `bytes` as one ABC file and builds the link tables spec §4.6
    /// calls for. Does not run any script; call [`Avm2::execute_entry_point`]
    /// for that.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::load_with_host(bytes, Rc::new(EmptyHostRegistry))
    }

    pub fn load_with_host(bytes: &[u8], host: Rc<dyn HostRegistry>) -> Result<Self> {
        let abc = Rc::new(AbcFile::decode(bytes)?);
        let unit = Rc::new(TranslationUnit::new(abc));

        let mut qname_to_class = FnvHashMap::default();
        for (class_index, instance) in unit.abc().instances.iter().enumerate() {
            if let Some((ns, name)) = unit.resolve_qname(instance.name_index) {
                qname_to_class.insert((ns.uri, name), class_index as u32);
            }
        }
        tracing::debug!(
            methods = unit.abc().methods.len(),
            classes = unit.abc().instances.len(),
            scripts = unit.abc().scripts.len(),
            "loaded ABC program",
        );

        Ok(Avm2 {
            class_objects: vec![None; unit.abc().instances.len()],
            global: Object::new_global(),
            qname_to_class,
            unit,
            host,
        })
    }

    pub fn global(&self) -> Object {
        self.global.clone()
    }

    pub fn unit(&self) -> &Rc<TranslationUnit> {
        &self.unit
    }

    pub fn class_index_for_qname(&self, namespace: &str, name: &str) -> Option<u32> {
        self.qname_to_class.get(&(Rc::from(namespace), Rc::from(name))).copied()
    }

    pub fn resolve_host_class(&self, namespace: &str, name: &str) -> Option<Object> {
        self.host.resolve_class(namespace, name)
    }

    /// Invokes the last script in the program (spec §4.6), using the global
    /// object as `this`. A program with multiple scripts runs only its
    /// last one as the entry point, matching a SWF's single `DoABC`-tag
    /// root script convention.
    pub fn execute_entry_point(&mut self) -> Result<Value> {
        let script = self
            .unit
            .abc()
            .scripts
            .last()
            .ok_or_else(|| Error::Link("program has no scripts".into()))?;
        let init_index = script.init_index;
        self.execute_method(init_index, Value::Object(self.global.clone()), &[])
    }

    /// Builds an environment for `method_index` and runs it to completion.
    pub fn execute_method(&mut self, method_index: u32, this: Value, args: &[Value]) -> Result<Value> {
        let method = Rc::new(BytecodeMethod::new(self.unit.clone(), method_index));
        let saved_scope = ScopeChain::new(vec![Scope::new(self.global.clone())]);
        self.invoke(method, saved_scope, this, args)
    }

    /// Runs a closure: a method plus the scope chain captured when it was
    /// created (spec §3 "back reference to the enclosing saved scope
    /// chain"). Environment construction follows spec §4.6 steps 1-6.
    pub fn invoke(&mut self, method: Rc<BytecodeMethod>, saved_scope: ScopeChain, this: Value, args: &[Value]) -> Result<Value> {
        let mut activation = Activation::new(method.clone(), saved_scope)?;
        let info = method.info();
        let param_count = info.param_count as usize;

        // 1-2: registers allocated by Activation::new; register 0 <- this.
        let this = if matches!(this, Value::Undefined) {
            Value::Object(self.global.clone())
        } else {
            this
        };
        activation.set_local(0, this)?;

        // 3: registers 1..=k <- arguments, truncated/padded to param_count.
        // Declared parameters beyond the supplied arguments fall back to
        // their declared default (spec's `HAS_OPTIONAL`, applying to the
        // trailing `options.len()` parameters) or otherwise stay undefined,
        // which Activation::new already filled every register with.
        let option_start = param_count.saturating_sub(info.options.len());
        for i in 0..param_count {
            let value = match args.get(i) {
                Some(value) => value.clone(),
                None if i >= option_start => decode_option_default(&method, &info.options[i - option_start]),
                None => Value::Undefined,
            };
            activation.set_local(1 + i as u32, value)?;
        }

        // 5/6: NEED_REST / NEED_ARGUMENTS occupy the slot after the last
        // declared parameter.
        let rest_register = 1 + param_count as u32;
        if info.flags.contains(MethodFlags::NEED_REST) {
            let rest: Vec<Value> = args.iter().skip(param_count).cloned().collect();
            if rest_register < activation.local_count() as u32 {
                activation.set_local(rest_register, Value::Object(Object::new_array(rest, None)))?;
            }
        } else if info.flags.contains(MethodFlags::NEED_ARGUMENTS) {
            let arguments: Vec<Value> = args.to_vec();
            if rest_register < activation.local_count() as u32 {
                activation.set_local(rest_register, Value::Object(Object::new_array(arguments, None)))?;
            }
        }

        interpreter::run(self, &mut activation)
    }

    /// Dispatches a call to any callable [`Value`] (spec §4.5 "Calls and
    /// construction": uniform pop-args/pop-receiver/invoke/push-result
    /// shape, implemented once here for every call-family opcode).
    pub fn call_value(&mut self, callee: &Value, receiver: Option<Value>, args: &[Value]) -> Result<Value> {
        let object = match callee {
            Value::Object(obj) => obj,
            other => return Err(Error::type_error(format!("{} is not a function", other.type_name()))),
        };
        match object.as_function_kind() {
            Some(FunctionKind::Bytecode(f)) => {
                self.invoke(f.method.clone(), f.scope.clone(), receiver.unwrap_or(Value::Undefined), args)
            }
            Some(FunctionKind::Native(f)) => f(receiver, args),
            None => {
                if object.as_class_data().is_some() {
                    // Calling a class like a function coerces its argument
                    // (AS3 `String(x)`-style cast); out of scope without a
                    // host type registry, so this degrades to `construct`.
                    Ok(Value::Object(self.construct_value(callee, args)?))
                } else {
                    Err(Error::type_error("value is not callable"))
                }
            }
        }
    }

    /// `construct`/`constructprop`/`newclass`'s instance creation path.
    pub fn construct_value(&mut self, callee: &Value, args: &[Value]) -> Result<Object> {
        let object = match callee {
            Value::Object(obj) => obj,
            other => return Err(Error::type_error(format!("{} is not a constructor", other.type_name()))),
        };
        if let Some(class_data) = object.as_class_data() {
            let instance = Object::new_plain(Some(class_data.class_index));
            self.initialize_instance(&instance, class_data.class_index, args)?;
            return Ok(instance);
        }
        Err(Error::type_error("value is not a constructor"))
    }

    /// Runs a class's instance initializer on a freshly allocated instance,
    /// then recursively its superclass's (via `constructsuper`, which calls
    /// back into [`Avm2::run_instance_init`] through the interpreter) — the
    /// base case here only starts the chain at the most-derived class.
    fn initialize_instance(&mut self, instance: &Object, class_index: u32, args: &[Value]) -> Result<()> {
        let info = &self.unit.abc().instances[class_index as usize];
        let init_index = info.instance_init_index;
        self.execute_method(init_index, Value::Object(instance.clone()), args)?;
        Ok(())
    }

    /// `constructsuper` (spec §4.5.2): invokes the base class's instance
    /// initializer on an already-allocated `receiver`.
    pub fn construct_super(&mut self, receiver: &Value, class_index: u32, args: &[Value]) -> Result<()> {
        if matches!(receiver, Value::Undefined | Value::Null) {
            return Err(Error::type_error("constructsuper on null or undefined receiver"));
        }
        let info = &self.unit.abc().instances[class_index as usize];
        if info.super_name_index == 0 {
            return Ok(());
        }
        let (ns, name) = self
            .unit
            .resolve_qname(info.super_name_index)
            .ok_or_else(|| Error::Link("constructsuper: superclass multiname is not a QName".into()))?;
        let super_index = self.class_index_for_qname(&ns.uri, &name);
        match super_index {
            Some(super_index) => {
                let super_info = &self.unit.abc().instances[super_index as usize];
                let init_index = super_info.instance_init_index;
                self.execute_method(init_index, receiver.clone(), args)?;
                Ok(())
            }
            None => {
                // Superclass lives in the host registry (e.g. `Object`):
                // nothing more for this crate to run (spec §1, host class
                // library out of scope).
                Ok(())
            }
        }
    }

    /// `newclass index` (spec §4.5.1).
    pub fn new_class(&mut self, class_index: u32, base_type: Value) -> Result<Object> {
        if let Some(cached) = self.class_objects.get(class_index as usize).and_then(|c| c.clone()) {
            return Ok(cached);
        }

        let base_index = match &base_type {
            Value::Object(obj) => obj.as_class_data().map(|c| c.class_index),
            _ => None,
        };
        let class_object = Object::new_class(class_index, base_index);

        let class_info = &self.unit.abc().classes[class_index as usize];
        for trait_ in &class_info.traits {
            if let TraitKind::Const { .. } = &trait_.kind {
                let (ns, name) = self
                    .resolve_trait_name(trait_.name_index)
                    .unwrap_or((Namespace::any(), Rc::from("")));
                let key = PropertyKey::new(ns.uri, name);
                class_object.declare_trait(key, Property::Slot(Value::Undefined));
            }
        }

        if let Some(slot) = self.class_objects.get_mut(class_index as usize) {
            *slot = Some(class_object.clone());
        }

        let init_index = class_info.class_init_index;
        self.execute_method(init_index, Value::Object(class_object.clone()), &[])?;

        Ok(class_object)
    }

    fn resolve_trait_name(&self, name_index: u32) -> Option<(Namespace, Rc<str>)> {
        self.unit.resolve_qname(name_index)
    }

    pub fn make_native_function(&self, f: NativeFn) -> Object {
        Object::new_native_function(f, None)
    }
}

fn decode_option_default(method: &BytecodeMethod, option: &abc::OptionDetail) -> Value {
    let unit = &method.unit;
    let pool = &unit.abc().constant_pool;
    match option.value_kind {
        0x03 => Value::Int(pool.int(option.value_index)),
        0x04 => Value::Uint(pool.uint(option.value_index)),
        0x06 => Value::Number(pool.double(option.value_index)),
        0x01 => Value::String(unit.pool_string(option.value_index)),
        0x08 => Value::Namespace(unit.pool_namespace(option.value_index)),
        0x0a | 0x0b => Value::Bool(option.value_kind == 0x0b),
        0x0c => Value::Null,
        0x00 => Value::Undefined,
        _ => Value::Undefined,
    }
}
