//! Multiname-to-binding resolution (spec §4.4).
//!
//! Two independent jobs live here, matching the component design's two call
//! shapes: (1) turning a possibly-runtime-qualified [`abc::Multiname`] into a
//! concrete name plus a candidate namespace list (popping from the operand
//! stack as needed), and (2) searching a scope-chain-shaped list of objects
//! for the first one that defines that name.

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::object::Object;
use crate::script::TranslationUnit;
use crate::value::Value;
use std::rc::Rc;

/// A multiname resolved down to a local name and the ordered set of
/// namespaces it may live in. Every multiname kind collapses to this shape
/// once runtime-supplied parts (if any) have been popped off the stack.
#[derive(Clone, Debug)]
pub struct ResolvedName {
    pub name: Rc<str>,
    pub namespaces: Vec<Namespace>,
}

pub fn resolve_multiname(
    unit: &TranslationUnit,
    multiname_index: u32,
    act: &mut Activation,
) -> Result<ResolvedName> {
    let multiname = unit
        .abc()
        .constant_pool
        .multiname(multiname_index)
        .ok_or_else(|| Error::Link(format!("multiname index {multiname_index} out of range")))?
        .clone();
    resolve_multiname_inner(unit, &multiname, act)
}

fn resolve_multiname_inner(
    unit: &TranslationUnit,
    multiname: &abc::Multiname,
    act: &mut Activation,
) -> Result<ResolvedName> {
    use abc::Multiname::*;
    match multiname {
        QName { namespace_index, name_index } | QNameA { namespace_index, name_index } => Ok(ResolvedName {
            name: unit.pool_string(*name_index),
            namespaces: vec![unit.pool_namespace(*namespace_index)],
        }),
        RTQName { name_index } | RTQNameA { name_index } => {
            let namespace = pop_namespace(act)?;
            Ok(ResolvedName {
                name: unit.pool_string(*name_index),
                namespaces: vec![namespace],
            })
        }
        RTQNameL | RTQNameLA => {
            // Defined pop order (spec §4.4): namespace first, then name.
            let namespace = pop_namespace(act)?;
            let name = pop_name(act)?;
            Ok(ResolvedName {
                name,
                namespaces: vec![namespace],
            })
        }
        Multiname { name_index, namespace_set_index } | MultinameA { name_index, namespace_set_index } => {
            Ok(ResolvedName {
                name: unit.pool_string(*name_index),
                namespaces: unit.pool_namespace_set(*namespace_set_index),
            })
        }
        MultinameL { namespace_set_index } | MultinameLA { namespace_set_index } => {
            let name = pop_name(act)?;
            Ok(ResolvedName {
                name,
                namespaces: unit.pool_namespace_set(*namespace_set_index),
            })
        }
        TypeName { base_index, .. } => {
            let base = unit
                .abc()
                .constant_pool
                .multiname(*base_index)
                .ok_or_else(|| Error::Link(format!("multiname index {base_index} out of range")))?
                .clone();
            resolve_multiname_inner(unit, &base, act)
        }
    }
}

fn pop_namespace(act: &mut Activation) -> Result<Namespace> {
    let value = act.pop()?;
    Ok(match value {
        Value::Namespace(ns) => ns,
        other => Namespace::public(other.to_avm_string()),
    })
}

fn pop_name(act: &mut Activation) -> Result<Rc<str>> {
    Ok(act.pop()?.to_avm_string())
}

/// Search-list discipline for one scope slot (spec §4.4, last paragraph).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchKind {
    /// An ordinary scope: only declared traits are visible.
    Plain,
    /// A `with` scope: declared traits and dynamic properties are both
    /// visible.
    With,
    /// The global object: traits, dynamics, and (no prototype chain in
    /// this system; see spec §1 Non-goals on the host class library).
    Global,
}

pub struct SearchSlot {
    pub object: Object,
    pub kind: SearchKind,
}

impl SearchSlot {
    pub fn plain(object: Object) -> Self {
        SearchSlot { object, kind: SearchKind::Plain }
    }

    pub fn with_scope(object: Object) -> Self {
        SearchSlot { object, kind: SearchKind::With }
    }

    pub fn global(object: Object) -> Self {
        SearchSlot { object, kind: SearchKind::Global }
    }
}

/// Searches `search_list` innermost-first (the list's last entry is
/// searched first) for an object defining `resolved`. Declared traits are
/// always visible; dynamic properties are only visible through `with`
/// scopes and the global object (spec §4.4).
pub fn find_in_search_list(search_list: &[SearchSlot], resolved: &ResolvedName) -> Option<Object> {
    search_list.iter().rev().find_map(|slot| {
        let key = slot.object.find_key(&resolved.namespaces, &resolved.name)?;
        if slot.object.has_trait(&key) || matches!(slot.kind, SearchKind::With | SearchKind::Global) {
            Some(slot.object.clone())
        } else {
            None
        }
    })
}

/// Strict search (`findpropstrict`, `getlex`): raises `ReferenceError` if
/// nothing in the search list defines the name.
pub fn find_property_strict(search_list: &[SearchSlot], resolved: &ResolvedName) -> Result<Object> {
    find_in_search_list(search_list, resolved)
        .ok_or_else(|| Error::reference(format!("Property {} not found", resolved.name)))
}

/// Lenient search (`findproperty`): falls back to the global object
/// (assumed to be the outermost entry of `search_list`) rather than
/// raising.
pub fn find_property_lenient(search_list: &[SearchSlot], resolved: &ResolvedName, global: &Object) -> Object {
    find_in_search_list(search_list, resolved).unwrap_or_else(|| global.clone())
}
