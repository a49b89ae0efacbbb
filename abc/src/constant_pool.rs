//! The ABC constant pool: seven parallel, 1-indexed tables.
//!
//! Every table reserves index 0 for a kind-specific sentinel rather than
//! storing a real entry there (the AVM2 Overview calls this "the zeroth
//! entry does not exist"; in practice it resolves to a fixed default value
//! at every lookup site, so we store it that way instead of special-casing
//! index 0 in every caller).

use crate::error::DecodeError;
use crate::multiname::Multiname;
use crate::namespace::{Namespace, NamespaceKind, NamespaceSet};
use crate::reader::Reader;

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pub ints: Vec<i32>,
    pub uints: Vec<u32>,
    pub doubles: Vec<f64>,
    pub strings: Vec<String>,
    pub namespaces: Vec<Namespace>,
    pub namespace_sets: Vec<NamespaceSet>,
    pub multinames: Vec<Multiname>,
}

impl ConstantPool {
    /// Index 0 of every pool is reserved for this sentinel. Real entries
    /// start at 1, and `constants.int(0)` below always returns this value
    /// rather than indexing the backing `Vec`.
    pub fn int(&self, index: u32) -> i32 {
        if index == 0 {
            0
        } else {
            self.ints.get(index as usize - 1).copied().unwrap_or(0)
        }
    }

    pub fn uint(&self, index: u32) -> u32 {
        if index == 0 {
            0
        } else {
            self.uints.get(index as usize - 1).copied().unwrap_or(0)
        }
    }

    pub fn double(&self, index: u32) -> f64 {
        if index == 0 {
            f64::NAN
        } else {
            self.doubles
                .get(index as usize - 1)
                .copied()
                .unwrap_or(f64::NAN)
        }
    }

    /// Index 0 is the "any"/null sentinel string, represented as the empty
    /// string; it also doubles as the wildcard local name `*` in QName
    /// contexts.
    pub fn string(&self, index: u32) -> &str {
        if index == 0 {
            ""
        } else {
            self.strings
                .get(index as usize - 1)
                .map(|s| s.as_str())
                .unwrap_or("")
        }
    }

    /// Index 0 is the "any namespace" sentinel.
    pub fn namespace(&self, index: u32) -> Namespace {
        if index == 0 {
            Namespace {
                kind: NamespaceKind::Namespace,
                name_index: 0,
            }
        } else {
            self.namespaces
                .get(index as usize - 1)
                .copied()
                .unwrap_or(Namespace {
                    kind: NamespaceKind::Namespace,
                    name_index: 0,
                })
        }
    }

    pub fn namespace_set(&self, index: u32) -> &NamespaceSet {
        static EMPTY: NamespaceSet = NamespaceSet {
            namespaces: Vec::new(),
        };
        if index == 0 {
            &EMPTY
        } else {
            self.namespace_sets
                .get(index as usize - 1)
                .unwrap_or(&EMPTY)
        }
    }

    /// Index 0 is the `*` ("any type") sentinel: no multiname is stored
    /// there, so callers that care about the "no type restriction" case
    /// (parameter/return type annotations) must check for `None` rather
    /// than being handed a dummy entry.
    pub fn multiname(&self, index: u32) -> Option<&Multiname> {
        if index == 0 {
            None
        } else {
            self.multinames.get(index as usize - 1)
        }
    }

    pub(crate) fn read(reader: &mut Reader) -> Result<Self, DecodeError> {
        let ints = read_table(reader, |r| r.read_var_i32())?;
        let uints = read_table(reader, |r| r.read_var_u32())?;
        let doubles = read_table(reader, |r| r.read_f64())?;
        let strings = read_table(reader, |r| r.read_string())?;
        let namespaces = read_table(reader, Namespace::read)?;
        let namespace_sets = read_table(reader, NamespaceSet::read)?;
        let multinames = read_table(reader, Multiname::read)?;

        Ok(ConstantPool {
            ints,
            uints,
            doubles,
            strings,
            namespaces,
            namespace_sets,
            multinames,
        })
    }
}

/// Reads a `var_u30` count `n` followed by `n - 1` entries (index 0 is the
/// sentinel and is never serialized), the layout every constant pool table
/// shares.
fn read_table<T>(
    reader: &mut Reader,
    mut read_one: impl FnMut(&mut Reader) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let count = reader.read_var_u32()?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut entries = Vec::with_capacity(count as usize - 1);
    for _ in 0..count - 1 {
        entries.push(read_one(reader)?);
    }
    Ok(entries)
}
