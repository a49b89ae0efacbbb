//! Metadata attached to traits via `[Foo(...)]`-style annotations.

use crate::error::DecodeError;
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataInfo {
    pub name_index: u32,
    /// Parallel key/value string-index arrays; a key index of 0 marks a
    /// positional (unnamed) argument.
    pub keys: Vec<u32>,
    pub values: Vec<u32>,
}

impl MetadataInfo {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let name_index = reader.read_var_u32()?;
        let count = reader.read_var_u32()?;
        let mut keys = Vec::with_capacity(count as usize);
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            keys.push(reader.read_var_u32()?);
            values.push(reader.read_var_u32()?);
        }
        Ok(MetadataInfo {
            name_index,
            keys,
            values,
        })
    }

    pub(crate) fn read_table(reader: &mut Reader) -> Result<Vec<Self>, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut metadata = Vec::with_capacity(count as usize);
        for _ in 0..count {
            metadata.push(MetadataInfo::read(reader)?);
        }
        Ok(metadata)
    }
}
