//! Property maps: object storage keyed by `(namespace, name)` pairs.
//!
//! Grounded in the teacher's `avm2::property::Property` (`Stored`/`Virtual`/
//! `Slot` variants); collapsed here to the two kinds this system actually
//! materializes once traits are applied: a plain value slot, or a
//! getter/setter accessor pair.

use crate::object::Object;
use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub namespace: Rc<str>,
    pub name: Rc<str>,
}

impl PropertyKey {
    pub fn new(namespace: impl Into<Rc<str>>, name: impl Into<Rc<str>>) -> Self {
        PropertyKey {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// A dynamic property created by assignment through a multiname that
    /// failed static resolution (spec §4.5.3) always lands in the public
    /// namespace.
    pub fn dynamic(name: impl Into<Rc<str>>) -> Self {
        PropertyKey::new("", name)
    }
}

#[derive(Clone, Debug)]
pub enum Property {
    Slot(Value),
    Accessor {
        get: Option<Object>,
        set: Option<Object>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    entries: IndexMap<PropertyKey, Property>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&Property> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: PropertyKey, value: Property) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &PropertyKey) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Finds a slot by local name alone, ignoring namespace, the way
    /// `setproperty`'s dynamic fallback and `nextname`/`nextvalue`
    /// enumeration need to.
    pub fn find_by_name(&self, name: &str) -> Option<&PropertyKey> {
        self.entries.keys().find(|k| &*k.name == name)
    }

    /// Iterates in declaration/insertion order, the order `nextname`/
    /// `nextvalue`/for-in observe.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &Property)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nth_key(&self, index: usize) -> Option<&PropertyKey> {
        self.entries.get_index(index).map(|(k, _)| k)
    }

    pub fn nth_value(&self, index: usize) -> Option<&Property> {
        self.entries.get_index(index).map(|(_, v)| v)
    }
}
