//! Scripts: the top-level code units a SWF's `DoABC` tag defines, each with
//! its own initializer method and top-level traits (globals it exports).

use crate::error::DecodeError;
use crate::reader::Reader;
use crate::trait_::Trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInfo {
    pub init_index: u32,
    pub traits: Vec<Trait>,
}

impl ScriptInfo {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let init_index = reader.read_var_u32()?;
        let traits = Trait::read_table(reader)?;
        Ok(ScriptInfo { init_index, traits })
    }

    pub(crate) fn read_table(reader: &mut Reader) -> Result<Vec<Self>, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut scripts = Vec::with_capacity(count as usize);
        for _ in 0..count {
            scripts.push(ScriptInfo::read(reader)?);
        }
        Ok(scripts)
    }
}
