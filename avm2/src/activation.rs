//! The per-invocation execution frame (spec §3 "MethodEnvironment", §4.6
//! environment construction).
//!
//! Registers, operand stack, and scope stack are not shared across
//! invocations: each [`Activation`] owns its own, sized to the method
//! body's declared `local_count`/`max_stack`/`max_scope_depth`, and is
//! dropped on return or unhandled exception. `smallvec` keeps the common
//! case (a handful of locals, a handful of stack slots) off the heap,
//! matching the teacher's use of `smallvec` throughout `avm2`.

use crate::error::{Error, Result};
use crate::method::BytecodeMethod;
use crate::scope::{Scope, ScopeChain};
use crate::value::Value;
use smallvec::SmallVec;
use std::rc::Rc;

pub struct Activation {
    pub method: Rc<BytecodeMethod>,
    registers: SmallVec<[Value; 8]>,
    operand_stack: SmallVec<[Value; 8]>,
    scope_stack: Vec<Scope>,
    max_scope_depth: usize,
    /// The scope chain captured when this method's closure was created
    /// (`newfunction`/`newclass`), consulted by `findproperty`/
    /// `findpropstrict`/`getlex` in addition to this invocation's own
    /// scope stack (spec §9 open question 1).
    pub saved_scope: ScopeChain,
    /// Byte offset into `method.body().code` of the next instruction to
    /// execute. The interpreter reads from and seeks this position on
    /// every branch.
    pub position: usize,
}

impl Activation {
    pub fn new(method: Rc<BytecodeMethod>, saved_scope: ScopeChain) -> Result<Self> {
        let body = method
            .body()
            .ok_or_else(|| Error::Link(format!("method {} has no body", method.method_index)))?;
        Ok(Activation {
            method,
            registers: SmallVec::from_elem(Value::Undefined, body.local_count as usize),
            operand_stack: SmallVec::with_capacity(body.max_stack as usize),
            scope_stack: Vec::with_capacity(body.max_scope_depth as usize),
            max_scope_depth: body.max_scope_depth as usize,
            saved_scope,
            position: 0,
        })
    }

    pub fn local_count(&self) -> usize {
        self.registers.len()
    }

    pub fn get_local(&self, index: u32) -> Result<Value> {
        self.registers
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Error::range(format!("register {index} out of range")))
    }

    pub fn set_local(&mut self, index: u32, value: Value) -> Result<()> {
        *self
            .registers
            .get_mut(index as usize)
            .ok_or_else(|| Error::range(format!("register {index} out of range")))? = value;
        Ok(())
    }

    pub fn push(&mut self, value: Value) {
        self.operand_stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value> {
        self.operand_stack
            .pop()
            .ok_or_else(|| Error::Link("operand stack underflow".into()))
    }

    pub fn pop_args(&mut self, arg_count: u32) -> Result<Vec<Value>> {
        let mut args = Vec::with_capacity(arg_count as usize);
        for _ in 0..arg_count {
            args.push(self.pop()?);
        }
        args.reverse();
        Ok(args)
    }

    pub fn peek(&self) -> Result<&Value> {
        self.operand_stack
            .last()
            .ok_or_else(|| Error::Link("operand stack underflow".into()))
    }

    pub fn stack_depth(&self) -> usize {
        self.operand_stack.len()
    }

    pub fn clear_stack(&mut self) {
        self.operand_stack.clear();
    }

    pub fn push_scope(&mut self, scope: Scope) -> Result<()> {
        if self.scope_stack.len() >= self.max_scope_depth {
            return Err(Error::range("scope stack exceeds max_scope_depth"));
        }
        self.scope_stack.push(scope);
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Result<Scope> {
        self.scope_stack
            .pop()
            .ok_or_else(|| Error::Link("scope stack underflow".into()))
    }

    pub fn clear_scopes(&mut self) {
        self.scope_stack.clear();
    }

    pub fn scope_stack(&self) -> &[Scope] {
        &self.scope_stack
    }

    pub fn scope_at(&self, index: u32) -> Result<Scope> {
        self.scope_stack
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Error::range(format!("scope index {index} out of range")))
    }
}
