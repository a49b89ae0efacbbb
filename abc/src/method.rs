//! Method signatures (`method_info`).
//!
//! A `MethodInfo` only describes a method's shape: parameter count and
//! types, flags, optional defaults. The executable bytecode lives in the
//! corresponding `method_body_info`, found by scanning the method-body table
//! for the entry whose `method_index` matches this method's position in the
//! method table (see [`crate::method_body::MethodBody`]).

use crate::error::DecodeError;
use crate::reader::Reader;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        const NEED_ARGUMENTS  = 0x01;
        const NEED_ACTIVATION = 0x02;
        const NEED_REST       = 0x04;
        const HAS_OPTIONAL    = 0x08;
        const IGNORE_REST     = 0x10;
        const NATIVE          = 0x20;
        const SET_DXNS        = 0x40;
        const HAS_PARAM_NAMES = 0x80;
    }
}

/// One entry of a method's optional-parameter default-value table: a
/// constant pool index paired with the kind tag that says which of the
/// seven pools it indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDetail {
    pub value_index: u32,
    pub value_kind: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub param_count: u32,
    /// Multiname index of the declared return type, or 0 for untyped (`*`).
    pub return_type_index: u32,
    /// Multiname index per parameter, declaration order, 0 for untyped.
    pub param_type_indices: Vec<u32>,
    /// String index of the method's name, used for diagnostics; 0 if absent.
    pub name_index: u32,
    pub flags: MethodFlags,
    /// Present only when `flags` has `HAS_OPTIONAL`. Applies to the
    /// trailing `options.len()` parameters, in declaration order.
    pub options: Vec<OptionDetail>,
    /// Present only when `flags` has `HAS_PARAM_NAMES`. One string index
    /// per parameter.
    pub param_names: Vec<u32>,
}

impl MethodInfo {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let param_count = reader.read_var_u32()?;
        let return_type_index = reader.read_var_u32()?;
        let mut param_type_indices = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            param_type_indices.push(reader.read_var_u32()?);
        }
        let name_index = reader.read_var_u32()?;
        let flags = MethodFlags::from_bits_truncate(reader.read_u8()?);

        let options = if flags.contains(MethodFlags::HAS_OPTIONAL) {
            let count = reader.read_var_u32()?;
            let mut options = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let value_index = reader.read_var_u32()?;
                let value_kind = reader.read_u8()?;
                options.push(OptionDetail {
                    value_index,
                    value_kind,
                });
            }
            options
        } else {
            Vec::new()
        };

        let param_names = if flags.contains(MethodFlags::HAS_PARAM_NAMES) {
            let mut names = Vec::with_capacity(param_count as usize);
            for _ in 0..param_count {
                names.push(reader.read_var_u32()?);
            }
            names
        } else {
            Vec::new()
        };

        Ok(MethodInfo {
            param_count,
            return_type_index,
            param_type_indices,
            name_index,
            flags,
            options,
            param_names,
        })
    }

    pub(crate) fn read_table(reader: &mut Reader) -> Result<Vec<Self>, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut methods = Vec::with_capacity(count as usize);
        for _ in 0..count {
            methods.push(MethodInfo::read(reader)?);
        }
        Ok(methods)
    }
}
