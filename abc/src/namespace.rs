//! Namespace and namespace-set constant pool entries.

use crate::error::DecodeError;
use crate::reader::Reader;

/// The kind byte of a namespace constant-pool entry.
///
/// Values match the published AVM2 Overview kind table; they distinguish
/// otherwise-identical names, not just serve as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    Namespace,
    PackageNamespace,
    PackageInternalNamespace,
    ProtectedNamespace,
    ExplicitNamespace,
    StaticProtectedNamespace,
    PrivateNamespace,
}

impl NamespaceKind {
    fn from_byte(byte: u8, offset: usize) -> Result<Self, DecodeError> {
        Ok(match byte {
            0x08 => NamespaceKind::Namespace,
            0x16 => NamespaceKind::PackageNamespace,
            0x17 => NamespaceKind::PackageInternalNamespace,
            0x18 => NamespaceKind::ProtectedNamespace,
            0x19 => NamespaceKind::ExplicitNamespace,
            0x1a => NamespaceKind::StaticProtectedNamespace,
            0x05 => NamespaceKind::PrivateNamespace,
            kind => return Err(DecodeError::InvalidNamespaceKind { offset, kind }),
        })
    }
}

/// A decoded namespace constant: a kind tag plus an index into the string
/// pool (index 0 is the empty/"any" string sentinel, used by private
/// namespaces that have no name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub kind: NamespaceKind,
    pub name_index: u32,
}

impl Namespace {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let offset = reader.position();
        let kind = NamespaceKind::from_byte(reader.read_u8()?, offset)?;
        let name_index = reader.read_var_u32()?;
        Ok(Namespace { kind, name_index })
    }
}

/// A namespace set constant: an ordered, non-empty (except for index 0's
/// sentinel) list of indices into the namespace pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceSet {
    pub namespaces: Vec<u32>,
}

impl NamespaceSet {
    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let count = reader.read_var_u32()?;
        let mut namespaces = Vec::with_capacity(count as usize);
        for _ in 0..count {
            namespaces.push(reader.read_var_u32()?);
        }
        Ok(NamespaceSet { namespaces })
    }
}
