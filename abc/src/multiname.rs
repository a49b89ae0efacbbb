//! Multiname constant pool entries.
//!
//! A multiname is a late-bound name: depending on kind, the namespace and/or
//! the local name may be fixed at decode time (indices into the constant
//! pool) or left to be supplied at runtime (popped off the operand stack by
//! the name resolver). See the AVM2 Overview's multiname kind table for the
//! byte values below; we dispatch on them once, here, rather than re-deciding
//! "is this name runtime-qualified" at every call site that consumes one.

use crate::error::DecodeError;
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiname {
    QName {
        namespace_index: u32,
        name_index: u32,
    },
    QNameA {
        namespace_index: u32,
        name_index: u32,
    },
    RTQName {
        name_index: u32,
    },
    RTQNameA {
        name_index: u32,
    },
    RTQNameL,
    RTQNameLA,
    Multiname {
        name_index: u32,
        namespace_set_index: u32,
    },
    MultinameA {
        name_index: u32,
        namespace_set_index: u32,
    },
    MultinameL {
        namespace_set_index: u32,
    },
    MultinameLA {
        namespace_set_index: u32,
    },
    TypeName {
        base_index: u32,
        type_args: Vec<u32>,
    },
}

impl Multiname {
    /// Whether any part of this name must be supplied at runtime (popped
    /// from the operand stack by the name resolver) rather than being fully
    /// resolved from the constant pool alone.
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            Multiname::RTQName { .. }
                | Multiname::RTQNameA { .. }
                | Multiname::RTQNameL
                | Multiname::RTQNameLA
                | Multiname::MultinameL { .. }
                | Multiname::MultinameLA { .. }
        )
    }

    /// Whether this is an attribute-qualified name (`@foo`-style).
    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            Multiname::QNameA { .. }
                | Multiname::RTQNameA { .. }
                | Multiname::RTQNameLA
                | Multiname::MultinameA { .. }
                | Multiname::MultinameLA { .. }
        )
    }

    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let offset = reader.position();
        let kind = reader.read_u8()?;
        Ok(match kind {
            0x07 => Multiname::QName {
                namespace_index: reader.read_var_u32()?,
                name_index: reader.read_var_u32()?,
            },
            0x0d => Multiname::QNameA {
                namespace_index: reader.read_var_u32()?,
                name_index: reader.read_var_u32()?,
            },
            0x0f => Multiname::RTQName {
                name_index: reader.read_var_u32()?,
            },
            0x10 => Multiname::RTQNameA {
                name_index: reader.read_var_u32()?,
            },
            0x11 => Multiname::RTQNameL,
            0x12 => Multiname::RTQNameLA,
            0x09 => Multiname::Multiname {
                name_index: reader.read_var_u32()?,
                namespace_set_index: reader.read_var_u32()?,
            },
            0x0e => Multiname::MultinameA {
                name_index: reader.read_var_u32()?,
                namespace_set_index: reader.read_var_u32()?,
            },
            0x1b => Multiname::MultinameL {
                namespace_set_index: reader.read_var_u32()?,
            },
            0x1c => Multiname::MultinameLA {
                namespace_set_index: reader.read_var_u32()?,
            },
            0x1d => {
                let base_index = reader.read_var_u32()?;
                let arg_count = reader.read_var_u32()?;
                let mut type_args = Vec::with_capacity(arg_count as usize);
                for _ in 0..arg_count {
                    type_args.push(reader.read_var_u32()?);
                }
                Multiname::TypeName {
                    base_index,
                    type_args,
                }
            }
            kind => return Err(DecodeError::InvalidMultinameKind { offset, kind }),
        })
    }
}
