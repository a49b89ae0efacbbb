//! Top-level ABC file layout and the public decode entry point.

use crate::class::{ClassInfo, InstanceInfo};
use crate::constant_pool::ConstantPool;
use crate::error::DecodeError;
use crate::metadata::MetadataInfo;
use crate::method::MethodInfo;
use crate::method_body::MethodBody;
use crate::reader::Reader;
use crate::script::ScriptInfo;

/// A fully decoded ABC file: every table resolved and index-addressable,
/// with no back-patching required. Semantic validation (does `max_stack`
/// hold, are multiname kinds consistent with how they're used) is not
/// performed here — malformed-but-well-typed programs surface as runtime
/// errors once executed, not as decode failures.
#[derive(Debug, Clone)]
pub struct AbcFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub methods: Vec<MethodInfo>,
    pub metadata: Vec<MetadataInfo>,
    pub instances: Vec<InstanceInfo>,
    pub classes: Vec<ClassInfo>,
    pub scripts: Vec<ScriptInfo>,
    pub method_bodies: Vec<MethodBody>,
}

impl AbcFile {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        Self::read(&mut reader)
    }

    fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        let constant_pool = ConstantPool::read(reader)?;
        let methods = MethodInfo::read_table(reader)?;
        let metadata = MetadataInfo::read_table(reader)?;

        let class_count = reader.read_var_u32()?;
        let mut instances = Vec::with_capacity(class_count as usize);
        for _ in 0..class_count {
            instances.push(InstanceInfo::read(reader)?);
        }
        let mut classes = Vec::with_capacity(class_count as usize);
        for _ in 0..class_count {
            classes.push(ClassInfo::read(reader)?);
        }

        let scripts = ScriptInfo::read_table(reader)?;
        let method_bodies = MethodBody::read_table(reader)?;

        Ok(AbcFile {
            minor_version,
            major_version,
            constant_pool,
            methods,
            metadata,
            instances,
            classes,
            scripts,
            method_bodies,
        })
    }
}
