//! Method bodies: the actual bytecode, one per non-native method.
//!
//! `method_index` links a body back to its [`crate::method::MethodInfo`]
//! entry; not every method has a body (native methods don't), and the
//! ABC format stores bodies in their own table rather than inline with
//! `method_info` for that reason.

use crate::error::DecodeError;
use crate::reader::Reader;
use crate::trait_::Trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// Start of the protected range, inclusive, as a byte offset into
    /// `code`.
    pub from: u32,
    /// End of the protected range, exclusive.
    pub to: u32,
    /// Byte offset of the catch handler.
    pub target: u32,
    /// Multiname index of the type the thrown value must match, or 0 for
    /// a catch-all handler.
    pub exc_type_index: u32,
    /// Multiname index of the catch variable's name, or 0 if unnamed.
    pub var_name_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    pub method_index: u32,
    pub max_stack: u32,
    pub local_count: u32,
    pub init_scope_depth: u32,
    pub max_scope_depth: u32,
    pub code: Vec<u8>,
    pub exceptions: Vec<ExceptionInfo>,
    pub traits: Vec<Trait>,
}

impl MethodBody {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let method_index = reader.read_var_u32()?;
        let max_stack = reader.read_var_u32()?;
        let local_count = reader.read_var_u32()?;
        let init_scope_depth = reader.read_var_u32()?;
        let max_scope_depth = reader.read_var_u32()?;
        let code_length = reader.read_var_u32()?;
        let code = reader.read_slice(code_length as usize)?.to_vec();

        let exception_count = reader.read_var_u32()?;
        let mut exceptions = Vec::with_capacity(exception_count as usize);
        for _ in 0..exception_count {
            exceptions.push(ExceptionInfo {
                from: reader.read_var_u32()?,
                to: reader.read_var_u32()?,
                target: reader.read_var_u32()?,
                exc_type_index: reader.read_var_u32()?,
                var_name_index: reader.read_var_u32()?,
            });
        }

        let traits = Trait::read_table(reader)?;

        Ok(MethodBody {
            method_index,
            max_stack,
            local_count,
            init_scope_depth,
            max_scope_depth,
            code,
            exceptions,
            traits,
        })
    }

    pub(crate) fn read_table(reader: &mut Reader) -> Result<Vec<Self>, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut bodies = Vec::with_capacity(count as usize);
        for _ in 0..count {
            bodies.push(MethodBody::read(reader)?);
        }
        Ok(bodies)
    }
}
