//! The dispatch loop and per-opcode handlers (spec §4.5).
//!
//! Each handler returns an [`InstructionOutcome`] rather than using
//! host-language control flow for branches/returns/throws (§9's design
//! note); [`run`] is the only place that interprets an outcome as an actual
//! jump, return, or exception-table lookup.

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::method::BytecodeMethod;
use crate::namespace::Namespace;
use crate::object::Object;
use crate::op::Op;
use crate::property::{Property, PropertyKey};
use crate::resolver::{find_property_lenient, find_property_strict, resolve_multiname, ResolvedName, SearchSlot};
use crate::scope::{Scope, ScopeChain};
use crate::script::TranslationUnit;
use crate::value::Value;
use crate::vm::Avm2;
use abc::Reader;
use std::cmp::Ordering;
use std::rc::Rc;

enum InstructionOutcome {
    Continue,
    /// An absolute byte offset into the method body's code, already
    /// adjusted for the base the opcode's offset is relative to (the
    /// position after the instruction for every branch except
    /// `lookupswitch`, which is relative to the switch instruction's own
    /// start — computed once here so `run`'s loop never has to know which
    /// convention produced it).
    Jump(usize),
    Return(Value),
    Throw(Value),
}

/// Runs `act` to completion, including any nested calls its bytecode makes
/// (those recurse through [`Avm2::invoke`] and return before this loop sees
/// another instruction). Exceptions raised inside this method are matched
/// against its own exception table (spec §7); uncaught, they propagate to
/// the caller as `Err`.
pub fn run(vm: &mut Avm2, act: &mut Activation) -> Result<Value> {
    let method = act.method.clone();
    let body = method
        .body()
        .ok_or_else(|| Error::Link(format!("method {} has no body", method.method_index)))?;

    loop {
        let start = act.position;
        if start >= body.code.len() {
            return Ok(Value::Undefined);
        }
        let mut reader = Reader::new(&body.code);
        reader.seek(start);
        let op = Op::decode(&mut reader)?;
        let next = reader.position();

        let result = execute_op(vm, act, &method, &op, start, next);
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(Error::Decode(e)) => return Err(Error::Decode(e)),
            Err(e @ Error::Link(_)) => return Err(e),
            Err(e) => InstructionOutcome::Throw(e.into_thrown_value()),
        };

        match outcome {
            InstructionOutcome::Continue => act.position = next,
            InstructionOutcome::Jump(target) => act.position = target,
            InstructionOutcome::Return(value) => return Ok(value),
            InstructionOutcome::Throw(value) => match find_handler(&method.unit, &body.exceptions, start, &value, vm) {
                Some(target) => {
                    act.clear_stack();
                    act.clear_scopes();
                    act.push(value);
                    act.position = target;
                }
                None => return Err(Error::Action(value)),
            },
        }
    }
}

fn find_handler(
    unit: &TranslationUnit,
    exceptions: &[abc::ExceptionInfo],
    position: usize,
    thrown: &Value,
    vm: &Avm2,
) -> Option<usize> {
    exceptions
        .iter()
        .find(|exc| {
            position >= exc.from as usize
                && position < exc.to as usize
                && matches_exception_type(unit, exc.exc_type_index, thrown, vm)
        })
        .map(|exc| exc.target as usize)
}

fn matches_exception_type(unit: &TranslationUnit, exc_type_index: u32, thrown: &Value, vm: &Avm2) -> bool {
    if exc_type_index == 0 {
        return true;
    }
    let Some((ns, name)) = unit.resolve_qname(exc_type_index) else {
        return true;
    };
    match thrown {
        Value::Object(obj) => obj.class_index() == vm.class_index_for_qname(&ns.uri, &name),
        _ => false,
    }
}

fn execute_op(
    vm: &mut Avm2,
    act: &mut Activation,
    method: &BytecodeMethod,
    op: &Op,
    start: usize,
    next: usize,
) -> Result<InstructionOutcome> {
    use InstructionOutcome::Continue;
    let unit = &method.unit;

    Ok(match op {
        // --- constant pushers ---
        Op::PushByte(v) => {
            act.push(Value::Int(*v as i32));
            Continue
        }
        Op::PushShort(v) => {
            act.push(Value::Int(*v));
            Continue
        }
        Op::PushInt(index) => {
            act.push(Value::Int(unit.abc().constant_pool.int(*index)));
            Continue
        }
        Op::PushUint(index) => {
            act.push(Value::Uint(unit.abc().constant_pool.uint(*index)));
            Continue
        }
        Op::PushDouble(index) => {
            act.push(Value::Number(unit.abc().constant_pool.double(*index)));
            Continue
        }
        Op::PushString(index) => {
            act.push(Value::String(unit.pool_string(*index)));
            Continue
        }
        Op::PushNamespace(index) => {
            act.push(Value::Namespace(unit.pool_namespace(*index)));
            Continue
        }
        Op::PushTrue => {
            act.push(Value::Bool(true));
            Continue
        }
        Op::PushFalse => {
            act.push(Value::Bool(false));
            Continue
        }
        Op::PushNull => {
            act.push(Value::Null);
            Continue
        }
        Op::PushNan => {
            act.push(Value::Number(f64::NAN));
            Continue
        }
        Op::PushUndefined => {
            act.push(Value::Undefined);
            Continue
        }

        // --- arithmetic / bitwise ---
        Op::Add => {
            let b = act.pop()?;
            let a = act.pop()?;
            let result = if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
                Value::String(Rc::from(format!("{}{}", a.to_avm_string(), b.to_avm_string())))
            } else {
                Value::Number(a.to_number() + b.to_number())
            };
            act.push(result);
            Continue
        }
        Op::AddI => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a.wrapping_add(b)));
            Continue
        }
        Op::Subtract => {
            let b = act.pop()?.to_number();
            let a = act.pop()?.to_number();
            act.push(Value::Number(a - b));
            Continue
        }
        Op::SubtractI => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a.wrapping_sub(b)));
            Continue
        }
        Op::Multiply => {
            let b = act.pop()?.to_number();
            let a = act.pop()?.to_number();
            act.push(Value::Number(a * b));
            Continue
        }
        Op::MultiplyI => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a.wrapping_mul(b)));
            Continue
        }
        Op::Divide => {
            let b = act.pop()?.to_number();
            let a = act.pop()?.to_number();
            act.push(Value::Number(a / b));
            Continue
        }
        Op::Modulo => {
            let b = act.pop()?.to_number();
            let a = act.pop()?.to_number();
            act.push(Value::Number(a % b));
            Continue
        }
        Op::Negate => {
            let v = act.pop()?.to_number();
            act.push(Value::Number(-v));
            Continue
        }
        Op::NegateI => {
            let v = act.pop()?.to_int32();
            act.push(Value::Int(v.wrapping_neg()));
            Continue
        }
        Op::Increment => {
            let v = act.pop()?.to_number();
            act.push(Value::Number(v + 1.0));
            Continue
        }
        Op::IncrementI => {
            let v = act.pop()?.to_int32();
            act.push(Value::Int(v.wrapping_add(1)));
            Continue
        }
        Op::Decrement => {
            let v = act.pop()?.to_number();
            act.push(Value::Number(v - 1.0));
            Continue
        }
        Op::DecrementI => {
            let v = act.pop()?.to_int32();
            act.push(Value::Int(v.wrapping_sub(1)));
            Continue
        }
        Op::Inclocal(index) => {
            let v = act.get_local(*index)?.to_number();
            act.set_local(*index, Value::Number(v + 1.0))?;
            Continue
        }
        Op::Declocal(index) => {
            let v = act.get_local(*index)?.to_number();
            act.set_local(*index, Value::Number(v - 1.0))?;
            Continue
        }
        Op::InclocalI(index) => {
            let v = act.get_local(*index)?.to_int32();
            act.set_local(*index, Value::Int(v.wrapping_add(1)))?;
            Continue
        }
        Op::DeclocalI(index) => {
            let v = act.get_local(*index)?.to_int32();
            act.set_local(*index, Value::Int(v.wrapping_sub(1)))?;
            Continue
        }
        Op::BitAnd => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a & b));
            Continue
        }
        Op::BitOr => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a | b));
            Continue
        }
        Op::BitXor => {
            let b = act.pop()?.to_int32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a ^ b));
            Continue
        }
        Op::BitNot => {
            let v = act.pop()?.to_int32();
            act.push(Value::Int(!v));
            Continue
        }
        Op::Lshift => {
            let b = act.pop()?.to_uint32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a.wrapping_shl(b & 0x1f)));
            Continue
        }
        Op::Rshift => {
            let b = act.pop()?.to_uint32();
            let a = act.pop()?.to_int32();
            act.push(Value::Int(a.wrapping_shr(b & 0x1f)));
            Continue
        }
        Op::Urshift => {
            let b = act.pop()?.to_uint32();
            let a = act.pop()?.to_uint32();
            act.push(Value::Uint(a.wrapping_shr(b & 0x1f)));
            Continue
        }

        // --- comparison ---
        Op::Equals => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(a.abstract_eq(&b)));
            Continue
        }
        Op::StrictEquals => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(a.strict_eq(&b)));
            Continue
        }
        Op::LessThan => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(compare(&a, &b) == Some(Ordering::Less)));
            Continue
        }
        Op::LessEquals => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(matches!(compare(&a, &b), Some(Ordering::Less) | Some(Ordering::Equal))));
            Continue
        }
        Op::GreaterThan => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(compare(&b, &a) == Some(Ordering::Less)));
            Continue
        }
        Op::GreaterEquals => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(Value::Bool(matches!(compare(&b, &a), Some(Ordering::Less) | Some(Ordering::Equal))));
            Continue
        }
        Op::Not => {
            let v = act.pop()?;
            act.push(Value::Bool(!v.to_boolean()));
            Continue
        }
        Op::IsType(index) => {
            let v = act.pop()?;
            act.push(Value::Bool(is_instance_of(vm, unit, &v, *index)));
            Continue
        }
        Op::IsTypeLate => {
            let type_val = act.pop()?;
            let v = act.pop()?;
            act.push(Value::Bool(instance_of_value(&v, &type_val)));
            Continue
        }
        Op::InstanceOf => {
            let class_val = act.pop()?;
            let obj_val = act.pop()?;
            act.push(Value::Bool(instance_of_value(&obj_val, &class_val)));
            Continue
        }
        Op::In => {
            let obj_val = act.pop()?;
            let name_val = act.pop()?;
            let name = name_val.to_avm_string();
            let result = match &obj_val {
                Value::Object(obj) => {
                    obj.indexed_get(&name).is_some() || obj.has_own_property(&PropertyKey::dynamic(name.clone()))
                }
                _ => false,
            };
            act.push(Value::Bool(result));
            Continue
        }
        Op::TypeOf => {
            let v = act.pop()?;
            act.push(Value::String(Rc::from(v.type_name())));
            Continue
        }

        // --- stack ---
        Op::Dup => {
            let v = act.peek()?.clone();
            act.push(v);
            Continue
        }
        Op::Pop => {
            act.pop()?;
            Continue
        }
        Op::Swap => {
            let b = act.pop()?;
            let a = act.pop()?;
            act.push(b);
            act.push(a);
            Continue
        }
        Op::Label | Op::Nop => Continue,

        // --- registers ---
        Op::GetLocal(index) => {
            act.push(act.get_local(*index)?);
            Continue
        }
        Op::SetLocal(index) => {
            let v = act.pop()?;
            act.set_local(*index, v)?;
            Continue
        }
        Op::GetLocal0 => {
            act.push(act.get_local(0)?);
            Continue
        }
        Op::GetLocal1 => {
            act.push(act.get_local(1)?);
            Continue
        }
        Op::GetLocal2 => {
            act.push(act.get_local(2)?);
            Continue
        }
        Op::GetLocal3 => {
            act.push(act.get_local(3)?);
            Continue
        }
        Op::SetLocal0 => {
            let v = act.pop()?;
            act.set_local(0, v)?;
            Continue
        }
        Op::SetLocal1 => {
            let v = act.pop()?;
            act.set_local(1, v)?;
            Continue
        }
        Op::SetLocal2 => {
            let v = act.pop()?;
            act.set_local(2, v)?;
            Continue
        }
        Op::SetLocal3 => {
            let v = act.pop()?;
            act.set_local(3, v)?;
            Continue
        }
        Op::Kill(index) => {
            act.set_local(*index, Value::Undefined)?;
            Continue
        }

        // --- scope ---
        Op::PushScope => {
            let v = act.pop()?;
            act.push_scope(Scope::new(expect_object(v)?))?;
            Continue
        }
        Op::PushWith => {
            let v = act.pop()?;
            act.push_scope(Scope::new_with(expect_object(v)?))?;
            Continue
        }
        Op::PopScope => {
            act.pop_scope()?;
            Continue
        }
        Op::GetScopeObject(index) => {
            let scope = act.scope_at(*index)?;
            act.push(Value::Object(scope.values().clone()));
            Continue
        }
        Op::GetGlobalScope => {
            act.push(Value::Object(vm.global()));
            Continue
        }
        Op::NewActivation => {
            act.push(Value::Object(Object::new_activation()));
            Continue
        }
        Op::NewCatch(_index) => {
            act.push(Value::Object(Object::new_catch()));
            Continue
        }

        // --- property access ---
        Op::GetProperty(index) => {
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let value = get_property(vm, &receiver, &resolved)?;
            act.push(value);
            Continue
        }
        Op::SetProperty(index) => {
            let value = act.pop()?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            set_property(vm, &receiver, &resolved, value)?;
            Continue
        }
        Op::InitProperty(index) => {
            let value = act.pop()?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            if let Value::Object(obj) = &receiver {
                let namespace = resolved.namespaces.first().map(|ns| ns.uri.clone()).unwrap_or_else(|| Rc::from(""));
                obj.declare_trait(PropertyKey::new(namespace, resolved.name.clone()), Property::Slot(value));
            } else {
                return Err(Error::type_error("cannot initialize a property on a non-object value"));
            }
            Continue
        }
        Op::DeleteProperty(index) => {
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let result = match &receiver {
                Value::Object(obj) => {
                    let key = obj
                        .find_key(&resolved.namespaces, &resolved.name)
                        .unwrap_or_else(|| PropertyKey::dynamic(resolved.name.clone()));
                    obj.delete_property(&key)
                }
                _ => false,
            };
            act.push(Value::Bool(result));
            Continue
        }
        Op::FindProperty(index) => {
            let resolved = resolve_multiname(unit, *index, act)?;
            let list = build_search_list(vm, act);
            let found = find_property_lenient(&list, &resolved, &vm.global());
            act.push(Value::Object(found));
            Continue
        }
        Op::FindPropStrict(index) => {
            let resolved = resolve_multiname(unit, *index, act)?;
            let list = build_search_list(vm, act);
            let found = find_property_strict(&list, &resolved)?;
            act.push(Value::Object(found));
            Continue
        }
        Op::GetLex(index) => {
            let resolved = resolve_multiname(unit, *index, act)?;
            let list = build_search_list(vm, act);
            let found = find_property_strict(&list, &resolved)?;
            let value = get_property(vm, &Value::Object(found), &resolved)?;
            act.push(value);
            Continue
        }
        Op::GetSlot(index) => {
            let receiver = act.pop()?;
            let obj = expect_object(receiver)?;
            let key = obj
                .nth_property_key(slot_position(*index)?)
                .ok_or_else(|| Error::range("slot index out of range"))?;
            let value = match obj.property(&key) {
                Some(Property::Slot(v)) => v,
                Some(Property::Accessor { get: Some(getter), .. }) => {
                    vm.call_value(&Value::Object(getter), Some(Value::Object(obj)), &[])?
                }
                _ => Value::Undefined,
            };
            act.push(value);
            Continue
        }
        Op::SetSlot(index) => {
            let value = act.pop()?;
            let receiver = act.pop()?;
            let obj = expect_object(receiver)?;
            let key = obj
                .nth_property_key(slot_position(*index)?)
                .ok_or_else(|| Error::range("slot index out of range"))?;
            obj.set_slot(key, value);
            Continue
        }
        Op::GetGlobalSlot(index) => {
            let global = vm.global();
            let key = global
                .nth_property_key(slot_position(*index)?)
                .ok_or_else(|| Error::range("global slot index out of range"))?;
            let value = match global.property(&key) {
                Some(Property::Slot(v)) => v,
                _ => Value::Undefined,
            };
            act.push(value);
            Continue
        }
        Op::SetGlobalSlot(index) => {
            let value = act.pop()?;
            let global = vm.global();
            let key = global
                .nth_property_key(slot_position(*index)?)
                .ok_or_else(|| Error::range("global slot index out of range"))?;
            global.set_slot(key, value);
            Continue
        }
        Op::GetSuper(index) => {
            // Property lookup is flattened across the hierarchy onto one
            // instance (constructsuper runs the base initializer on the
            // same receiver), so this degrades to an ordinary property
            // read; see DESIGN.md for the limitation this approximates.
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let value = get_property(vm, &receiver, &resolved)?;
            act.push(value);
            Continue
        }
        Op::SetSuper(index) => {
            let value = act.pop()?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            set_property(vm, &receiver, &resolved, value)?;
            Continue
        }
        Op::GetDescendants(index) => {
            let _resolved = resolve_multiname(unit, *index, act)?;
            act.pop()?;
            tracing::warn!("getdescendants: E4X descendant access is not implemented, returning undefined");
            act.push(Value::Undefined);
            Continue
        }
        Op::CheckFilter => Continue,

        // --- calls & construction ---
        Op::Call { arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let receiver = act.pop()?;
            let function = act.pop()?;
            let result = vm.call_value(&function, Some(receiver), &args)?;
            act.push(result);
            Continue
        }
        Op::CallMethod { index: _, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let _receiver = act.pop()?;
            tracing::warn!("callmethod: dispatch-id vtables are not built, returning undefined");
            let _ = args;
            act.push(Value::Undefined);
            Continue
        }
        Op::CallStatic { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let receiver = act.pop()?;
            let target = Rc::new(BytecodeMethod::new(unit.clone(), *index));
            let result = vm.invoke(target, act.saved_scope.clone(), receiver, &args)?;
            act.push(result);
            Continue
        }
        Op::CallSuper { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            let result = vm.call_value(&callee, Some(receiver), &args)?;
            act.push(result);
            Continue
        }
        Op::CallSuperVoid { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            vm.call_value(&callee, Some(receiver), &args)?;
            Continue
        }
        Op::CallProperty { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            let result = vm.call_value(&callee, Some(receiver), &args)?;
            act.push(result);
            Continue
        }
        Op::CallPropLex { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            let result = vm.call_value(&callee, None, &args)?;
            act.push(result);
            Continue
        }
        Op::CallPropVoid { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            vm.call_value(&callee, Some(receiver), &args)?;
            Continue
        }
        Op::Construct { arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let callee = act.pop()?;
            let instance = vm.construct_value(&callee, &args)?;
            act.push(Value::Object(instance));
            Continue
        }
        Op::ConstructSuper { arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let receiver = act.pop()?;
            let owning_class = unit
                .class_index_for_instance_init(method.method_index)
                .ok_or_else(|| Error::Link("constructsuper used outside an instance initializer".into()))?;
            vm.construct_super(&receiver, owning_class, &args)?;
            Continue
        }
        Op::ConstructProp { index, arg_count } => {
            let args = act.pop_args(*arg_count)?;
            let resolved = resolve_multiname(unit, *index, act)?;
            let receiver = act.pop()?;
            let callee = get_property(vm, &receiver, &resolved)?;
            let instance = vm.construct_value(&callee, &args)?;
            act.push(Value::Object(instance));
            Continue
        }
        Op::NewObject { arg_count } => {
            let obj = Object::new_plain(None);
            for _ in 0..*arg_count {
                let value = act.pop()?;
                let key = act.pop()?;
                obj.set_dynamic(&key.to_avm_string(), value);
            }
            act.push(Value::Object(obj));
            Continue
        }
        Op::NewArray { arg_count } => {
            let elements = act.pop_args(*arg_count)?;
            act.push(Value::Object(Object::new_array(elements, None)));
            Continue
        }
        Op::NewClass(index) => {
            let base_type = act.pop()?;
            let class_object = vm.new_class(*index, base_type)?;
            act.push(Value::Object(class_object));
            Continue
        }
        Op::NewFunction(index) => {
            let target = Rc::new(BytecodeMethod::new(unit.clone(), *index));
            let scope = capture_scope_chain(act);
            act.push(Value::Object(Object::new_bytecode_function(target, scope, None)));
            Continue
        }
        Op::ApplyType { arg_count } => {
            for _ in 0..*arg_count {
                act.pop()?;
            }
            let _base = act.pop()?;
            tracing::warn!("applytype: parameterized types are not implemented, returning undefined");
            act.push(Value::Undefined);
            Continue
        }

        // --- control flow ---
        Op::Jump(offset) => InstructionOutcome::Jump(branch_target(next, *offset)),
        Op::IfTrue(offset) => branch_if(act.pop()?.to_boolean(), next, *offset)?,
        Op::IfFalse(offset) => branch_if(!act.pop()?.to_boolean(), next, *offset)?,
        Op::IfEq(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(a.abstract_eq(&b), next, *offset)?
        }
        Op::IfNe(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(!a.abstract_eq(&b), next, *offset)?
        }
        Op::IfStrictEq(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(a.strict_eq(&b), next, *offset)?
        }
        Op::IfStrictNe(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(!a.strict_eq(&b), next, *offset)?
        }
        Op::IfLt(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(compare(&a, &b) == Some(Ordering::Less), next, *offset)?
        }
        Op::IfLe(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(matches!(compare(&a, &b), Some(Ordering::Less) | Some(Ordering::Equal)), next, *offset)?
        }
        Op::IfGt(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(compare(&b, &a) == Some(Ordering::Less), next, *offset)?
        }
        Op::IfGe(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(matches!(compare(&b, &a), Some(Ordering::Less) | Some(Ordering::Equal)), next, *offset)?
        }
        // The ifnXX family branches when the underlying comparison is the
        // ECMA-262 "undefined" result (a NaN operand); ifXX above does not.
        Op::IfNlt(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(compare(&a, &b) != Some(Ordering::Less), next, *offset)?
        }
        Op::IfNle(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(!matches!(compare(&a, &b), Some(Ordering::Less) | Some(Ordering::Equal)), next, *offset)?
        }
        Op::IfNgt(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(compare(&b, &a) != Some(Ordering::Less), next, *offset)?
        }
        Op::IfNge(offset) => {
            let b = act.pop()?;
            let a = act.pop()?;
            branch_if(!matches!(compare(&b, &a), Some(Ordering::Less) | Some(Ordering::Equal)), next, *offset)?
        }
        Op::LookupSwitch { default_offset, case_offsets } => {
            let index = act.pop()?.to_int32();
            let offset = usize_index(index)
                .and_then(|i| case_offsets.get(i))
                .copied()
                .unwrap_or(*default_offset);
            InstructionOutcome::Jump(branch_target(start, offset))
        }
        Op::ReturnValue => InstructionOutcome::Return(act.pop()?),
        Op::ReturnVoid => InstructionOutcome::Return(Value::Undefined),
        Op::Throw => InstructionOutcome::Throw(act.pop()?),

        // --- iteration ---
        Op::HasNext => {
            let index = act.pop()?.to_int32();
            let obj_value = act.pop()?;
            act.push(Value::Int(next_enumeration_index(&obj_value, index)));
            Continue
        }
        Op::HasNext2 { object_register, index_register } => {
            let obj_value = act.get_local(*object_register)?;
            let index = act.get_local(*index_register)?.to_int32();
            let next_index = next_enumeration_index(&obj_value, index);
            act.set_local(*index_register, Value::Int(next_index))?;
            act.push(Value::Bool(next_index != 0));
            Continue
        }
        Op::NextName => {
            let index = act.pop()?.to_int32();
            let obj_value = act.pop()?;
            act.push(enumeration_key(&obj_value, index));
            Continue
        }
        Op::NextValue => {
            let index = act.pop()?.to_int32();
            let obj_value = act.pop()?;
            act.push(enumeration_value(&obj_value, index));
            Continue
        }

        // --- coercions ---
        Op::ConvertI => {
            let v = act.pop()?;
            act.push(Value::Int(v.to_int32()));
            Continue
        }
        Op::ConvertU => {
            let v = act.pop()?;
            act.push(Value::Uint(v.to_uint32()));
            Continue
        }
        Op::ConvertD => {
            let v = act.pop()?;
            act.push(Value::Number(v.to_number()));
            Continue
        }
        Op::ConvertB => {
            let v = act.pop()?;
            act.push(Value::Bool(v.to_boolean()));
            Continue
        }
        Op::ConvertS => {
            let v = act.pop()?;
            act.push(Value::String(v.to_avm_string()));
            Continue
        }
        Op::ConvertO => {
            let v = act.pop()?;
            if matches!(v, Value::Undefined | Value::Null) {
                return Err(Error::type_error("cannot convert null or undefined to an object"));
            }
            act.push(v);
            Continue
        }
        Op::Coerce(index) => {
            let v = act.pop()?;
            act.push(coerce_to_named_type(unit, *index, v));
            Continue
        }
        Op::CoerceA => Continue,
        Op::CoerceS => {
            let v = act.pop()?;
            let coerced = if matches!(v, Value::Null) { Value::Null } else { Value::String(v.to_avm_string()) };
            act.push(coerced);
            Continue
        }
        Op::EscXAttr | Op::EscXElem => {
            tracing::warn!("{:?}: E4X escaping is not implemented, value passed through unchanged", op);
            Continue
        }
        Op::Dxns(_index) => {
            tracing::warn!("dxns: default XML namespace is not implemented");
            Continue
        }
        Op::DxnsLate => {
            act.pop()?;
            tracing::warn!("dxnslate: default XML namespace is not implemented");
            Continue
        }

        // --- debug ---
        Op::Debug { .. } | Op::DebugFile(_) | Op::DebugLine(_) => Continue,
    })
}

fn branch_if(condition: bool, next: usize, offset: i32) -> Result<InstructionOutcome> {
    Ok(if condition {
        InstructionOutcome::Jump(branch_target(next, offset))
    } else {
        InstructionOutcome::Continue
    })
}

fn branch_target(base: usize, offset: i32) -> usize {
    (base as i64 + offset as i64) as usize
}

fn usize_index(index: i32) -> Option<usize> {
    (index >= 0).then_some(index as usize)
}

/// `getslot`/`setslot`'s slot operand is 1-based (spec §4.5 Property
/// family); index 0 is malformed rather than "the first slot".
fn slot_position(index: u32) -> Result<usize> {
    (index as usize)
        .checked_sub(1)
        .ok_or_else(|| Error::range("slot index must be at least 1"))
}

fn expect_object(value: Value) -> Result<Object> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(Error::type_error(format!("expected an object, found {}", other.type_name()))),
    }
}

/// ECMA-262 §11.8.5 abstract relational comparison, collapsed to the
/// three-way result the `ifXX`/`ifnXX` families and the `less*`/`greater*`
/// opcodes all share. `None` is the "undefined" comparison result (NaN on
/// either side).
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::String(sa), Value::String(sb)) = (a, b) {
        return Some(sa.as_ref().cmp(sb.as_ref()));
    }
    let na = a.to_number();
    let nb = b.to_number();
    if na.is_nan() || nb.is_nan() {
        None
    } else {
        na.partial_cmp(&nb)
    }
}

fn is_instance_of(vm: &Avm2, unit: &TranslationUnit, value: &Value, multiname_index: u32) -> bool {
    let Some((ns, name)) = unit.resolve_qname(multiname_index) else {
        return true;
    };
    match &*name {
        "int" => matches!(value, Value::Int(_)),
        "uint" => matches!(value, Value::Uint(_)),
        "Number" => matches!(value, Value::Number(_) | Value::Int(_) | Value::Uint(_)),
        "String" => matches!(value, Value::String(_)),
        "Boolean" => matches!(value, Value::Bool(_)),
        "*" | "Object" => true,
        _ => match value {
            Value::Object(obj) => obj.class_index() == vm.class_index_for_qname(&ns.uri, &name),
            _ => false,
        },
    }
}

fn instance_of_value(value: &Value, type_value: &Value) -> bool {
    match (value, type_value) {
        (Value::Object(obj), Value::Object(type_obj)) => match type_obj.as_class_data() {
            Some(class_data) => obj.class_index() == Some(class_data.class_index),
            None => false,
        },
        _ => false,
    }
}

fn coerce_to_named_type(unit: &TranslationUnit, multiname_index: u32, value: Value) -> Value {
    let Some((_, name)) = unit.resolve_qname(multiname_index) else {
        return value;
    };
    match &*name {
        "int" => Value::Int(value.to_int32()),
        "uint" => Value::Uint(value.to_uint32()),
        "Number" => Value::Number(value.to_number()),
        "Boolean" => Value::Bool(value.to_boolean()),
        "String" => Value::String(value.to_avm_string()),
        _ => value,
    }
}

/// `obj.length` for an array specialization, property-map length otherwise;
/// `hasnext`/`hasnext2`'s notion of "how many enumerable slots" (spec §4.5
/// Iteration family).
fn enumerable_count(obj: &Object) -> usize {
    obj.array_len().unwrap_or_else(|| obj.property_count())
}

fn next_enumeration_index(obj_value: &Value, index: i32) -> i32 {
    match obj_value {
        Value::Object(obj) if (index as usize) < enumerable_count(obj) => index + 1,
        _ => 0,
    }
}

fn enumeration_key(obj_value: &Value, one_based_index: i32) -> Value {
    let Value::Object(obj) = obj_value else { return Value::Undefined };
    let zero_based = (one_based_index - 1).max(0) as usize;
    if let Some(len) = obj.array_len() {
        return if zero_based < len { Value::String(Rc::from(zero_based.to_string())) } else { Value::Undefined };
    }
    match obj.nth_property_key(zero_based) {
        Some(key) => Value::String(key.name),
        None => Value::Undefined,
    }
}

fn enumeration_value(obj_value: &Value, one_based_index: i32) -> Value {
    let Value::Object(obj) = obj_value else { return Value::Undefined };
    let zero_based = (one_based_index - 1).max(0) as usize;
    if obj.array_len().is_some() {
        return obj.indexed_get(&zero_based.to_string()).unwrap_or(Value::Undefined);
    }
    match obj.nth_property_key(zero_based).and_then(|key| obj.property(&key)) {
        Some(Property::Slot(v)) => v,
        _ => Value::Undefined,
    }
}

/// Search-list order for `findproperty`/`findpropstrict`/`getlex` (spec §9
/// open question 1): `[receiver, global] + scope_stack + saved scope
/// chain`, searched innermost-first by [`find_property_strict`]'s reverse
/// scan — which makes the saved (closure) scope chain the first place
/// checked, then this invocation's own scope stack, then global, then the
/// receiver as a last resort.
fn build_search_list(vm: &Avm2, act: &Activation) -> Vec<SearchSlot> {
    let mut list = Vec::new();
    if let Ok(Value::Object(receiver)) = act.get_local(0) {
        list.push(SearchSlot::plain(receiver));
    }
    list.push(SearchSlot::global(vm.global()));
    for scope in act.scope_stack() {
        list.push(scope_slot(scope));
    }
    for scope in act.saved_scope.iter() {
        list.push(scope_slot(scope));
    }
    list
}

fn scope_slot(scope: &Scope) -> SearchSlot {
    if scope.is_with() {
        SearchSlot::with_scope(scope.values().clone())
    } else {
        SearchSlot::plain(scope.values().clone())
    }
}

fn capture_scope_chain(act: &Activation) -> ScopeChain {
    let mut scopes: Vec<Scope> = act.saved_scope.iter().cloned().collect();
    scopes.extend(act.scope_stack().iter().cloned());
    ScopeChain::new(scopes)
}

fn get_property(vm: &mut Avm2, receiver: &Value, resolved: &ResolvedName) -> Result<Value> {
    let obj = match receiver {
        Value::Object(obj) => obj,
        // Primitive property access (e.g. `"x".length`) needs a host
        // string/number class this crate doesn't provide (spec §1).
        _ => return Ok(Value::Undefined),
    };
    if let Some(value) = obj.indexed_get(&resolved.name) {
        return Ok(value);
    }
    let key = obj
        .find_key(&resolved.namespaces, &resolved.name)
        .unwrap_or_else(|| PropertyKey::dynamic(resolved.name.clone()));
    match obj.property(&key) {
        Some(Property::Slot(v)) => Ok(v),
        Some(Property::Accessor { get: Some(getter), .. }) => {
            vm.call_value(&Value::Object(getter), Some(receiver.clone()), &[])
        }
        _ => Ok(Value::Undefined),
    }
}

fn set_property(vm: &mut Avm2, receiver: &Value, resolved: &ResolvedName, value: Value) -> Result<()> {
    let obj = match receiver {
        Value::Object(obj) => obj,
        _ => return Err(Error::type_error("cannot set a property on a non-object value")),
    };
    if obj.indexed_set(&resolved.name, value.clone()) {
        return Ok(());
    }
    if let Some(key) = obj.find_key(&resolved.namespaces, &resolved.name) {
        return match obj.property(&key) {
            Some(Property::Accessor { set: Some(setter), .. }) => {
                vm.call_value(&Value::Object(setter), Some(receiver.clone()), &[value]).map(|_| ())
            }
            Some(Property::Accessor { set: None, .. }) => Ok(()),
            _ => {
                obj.set_slot(key, value);
                Ok(())
            }
        };
    }
    obj.set_dynamic(&resolved.name, value);
    Ok(())
}
