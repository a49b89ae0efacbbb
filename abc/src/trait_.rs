//! Traits: the declared members of an instance, class, script, or method
//! body's activation record.

use crate::error::DecodeError;
use crate::reader::Reader;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraitAttributes: u8 {
        const FINAL    = 0x1;
        const OVERRIDE = 0x2;
        const METADATA = 0x4;
    }
}

/// The kind-specific payload of a trait, tagged exactly as the spec's §3
/// describes: `Slot`, `Const`, `Class`, `Function`, `Method`, `Getter`,
/// `Setter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraitKind {
    Slot {
        slot_id: u32,
        type_name_index: u32,
        value_index: u32,
        value_kind: u8,
    },
    Const {
        slot_id: u32,
        type_name_index: u32,
        value_index: u32,
        value_kind: u8,
    },
    Class {
        slot_id: u32,
        class_index: u32,
    },
    Function {
        slot_id: u32,
        function_index: u32,
    },
    Method {
        disp_id: u32,
        method_index: u32,
    },
    Getter {
        disp_id: u32,
        method_index: u32,
    },
    Setter {
        disp_id: u32,
        method_index: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trait {
    pub name_index: u32,
    pub attributes: TraitAttributes,
    pub kind: TraitKind,
    pub metadata: Vec<u32>,
}

impl Trait {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let name_index = reader.read_var_u32()?;
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let kind_tag = tag & 0x0f;
        let attributes = TraitAttributes::from_bits_truncate(tag >> 4);

        let kind = match kind_tag {
            0 => {
                let slot_id = reader.read_var_u32()?;
                let type_name_index = reader.read_var_u32()?;
                let value_index = reader.read_var_u32()?;
                let value_kind = if value_index != 0 { reader.read_u8()? } else { 0 };
                TraitKind::Slot {
                    slot_id,
                    type_name_index,
                    value_index,
                    value_kind,
                }
            }
            6 => {
                let slot_id = reader.read_var_u32()?;
                let type_name_index = reader.read_var_u32()?;
                let value_index = reader.read_var_u32()?;
                let value_kind = if value_index != 0 { reader.read_u8()? } else { 0 };
                TraitKind::Const {
                    slot_id,
                    type_name_index,
                    value_index,
                    value_kind,
                }
            }
            4 => TraitKind::Class {
                slot_id: reader.read_var_u32()?,
                class_index: reader.read_var_u32()?,
            },
            5 => TraitKind::Function {
                slot_id: reader.read_var_u32()?,
                function_index: reader.read_var_u32()?,
            },
            1 => TraitKind::Method {
                disp_id: reader.read_var_u32()?,
                method_index: reader.read_var_u32()?,
            },
            2 => TraitKind::Getter {
                disp_id: reader.read_var_u32()?,
                method_index: reader.read_var_u32()?,
            },
            3 => TraitKind::Setter {
                disp_id: reader.read_var_u32()?,
                method_index: reader.read_var_u32()?,
            },
            kind => {
                return Err(DecodeError::InvalidTraitKind { offset, kind });
            }
        };

        let metadata = if attributes.contains(TraitAttributes::METADATA) {
            let count = reader.read_var_u32()?;
            let mut indices = Vec::with_capacity(count as usize);
            for _ in 0..count {
                indices.push(reader.read_var_u32()?);
            }
            indices
        } else {
            Vec::new()
        };

        Ok(Trait {
            name_index,
            attributes,
            kind,
            metadata,
        })
    }

    pub(crate) fn read_table(reader: &mut Reader) -> Result<Vec<Self>, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut traits = Vec::with_capacity(count as usize);
        for _ in 0..count {
            traits.push(Trait::read(reader)?);
        }
        Ok(traits)
    }
}
