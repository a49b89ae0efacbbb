//! Runtime method handles: a decoded [`abc::MethodInfo`]/[`abc::MethodBody`]
//! pair bound to the translation unit that owns their constant pool, the
//! shape `crate::object::BytecodeFunction` closures over.

use crate::script::TranslationUnit;
use abc::{MethodBody, MethodInfo};
use std::rc::Rc;

/// A method as seen by the executor: everything needed to build a
/// [`crate::activation::Activation`] and run it, without re-indexing into
/// the owning [`abc::AbcFile`] at every call site.
pub struct BytecodeMethod {
    pub unit: Rc<TranslationUnit>,
    pub method_index: u32,
}

impl BytecodeMethod {
    pub fn new(unit: Rc<TranslationUnit>, method_index: u32) -> Self {
        BytecodeMethod { unit, method_index }
    }

    pub fn info(&self) -> &MethodInfo {
        &self.unit.abc().methods[self.method_index as usize]
    }

    /// `None` for native methods (`MethodFlags::NATIVE`), which have no
    /// entry in the method-body table.
    pub fn body(&self) -> Option<&MethodBody> {
        self.unit
            .body_index_for_method(self.method_index)
            .map(|body_index| &self.unit.abc().method_bodies[body_index as usize])
    }

    pub fn param_count(&self) -> u32 {
        self.info().param_count
    }
}
