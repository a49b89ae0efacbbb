//! Scope stacks and the captured scope chain closures carry.

use crate::object::Object;
use std::rc::Rc;

/// One entry of a scope stack: an object consulted during name resolution,
/// plus whether it is a `with` scope (which additionally exposes dynamic
/// properties rather than only declared traits, spec §4.4).
#[derive(Clone)]
pub struct Scope {
    values: Object,
    with: bool,
}

impl Scope {
    pub fn new(values: Object) -> Self {
        Scope {
            values,
            with: false,
        }
    }

    pub fn new_with(values: Object) -> Self {
        Scope { values, with: true }
    }

    pub fn values(&self) -> &Object {
        &self.values
    }

    pub fn is_with(&self) -> bool {
        self.with
    }
}

/// The scope chain a closure captures at the point it was created
/// (`newfunction`/`newclass`), shared cheaply between every invocation of
/// that closure.
#[derive(Clone, Default)]
pub struct ScopeChain {
    scopes: Rc<Vec<Scope>>,
}

impl ScopeChain {
    pub fn new(scopes: Vec<Scope>) -> Self {
        ScopeChain {
            scopes: Rc::new(scopes),
        }
    }

    pub fn empty() -> Self {
        ScopeChain {
            scopes: Rc::new(Vec::new()),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Scope> {
        self.scopes.get(index)
    }
}
