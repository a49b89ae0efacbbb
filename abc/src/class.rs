//! Classes as defined: an `instance_info`/`class_info` pair per class index.
//!
//! The two tables are parallel (`instances[i]` and `classes[i]` describe the
//! same class) rather than nested, matching the ABC file layout: all
//! instances are read, then all classes.

use crate::error::DecodeError;
use crate::reader::Reader;
use crate::trait_::Trait;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InstanceFlags: u8 {
        const SEALED       = 0x01;
        const FINAL        = 0x02;
        const INTERFACE    = 0x04;
        const PROTECTED_NS = 0x08;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    pub name_index: u32,
    /// Multiname index of the superclass, or 0 for `Object`'s own
    /// definition (which has none).
    pub super_name_index: u32,
    pub flags: InstanceFlags,
    /// Namespace index used for `protected` members; only meaningful when
    /// `flags` has `PROTECTED_NS`.
    pub protected_namespace_index: Option<u32>,
    pub interface_indices: Vec<u32>,
    pub instance_init_index: u32,
    pub traits: Vec<Trait>,
}

impl InstanceInfo {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let name_index = reader.read_var_u32()?;
        let super_name_index = reader.read_var_u32()?;
        let flags = InstanceFlags::from_bits_truncate(reader.read_u8()?);

        let protected_namespace_index = if flags.contains(InstanceFlags::PROTECTED_NS) {
            Some(reader.read_var_u32()?)
        } else {
            None
        };

        let interface_count = reader.read_var_u32()?;
        let mut interface_indices = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interface_indices.push(reader.read_var_u32()?);
        }

        let instance_init_index = reader.read_var_u32()?;
        let traits = Trait::read_table(reader)?;

        Ok(InstanceInfo {
            name_index,
            super_name_index,
            flags,
            protected_namespace_index,
            interface_indices,
            instance_init_index,
            traits,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub class_init_index: u32,
    pub traits: Vec<Trait>,
}

impl ClassInfo {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let class_init_index = reader.read_var_u32()?;
        let traits = Trait::read_table(reader)?;
        Ok(ClassInfo {
            class_init_index,
            traits,
        })
    }
}
