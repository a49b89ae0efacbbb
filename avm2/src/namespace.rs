//! Runtime namespaces: a resolved `(kind, uri)` pair.
//!
//! Unlike [`abc::Namespace`] (a kind byte plus a constant-pool string
//! index), this is fully resolved: the string has been looked up and
//! interned once by the owning [`crate::script::TranslationUnit`].

use abc::NamespaceKind;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Namespace {
    pub kind: NamespaceKind,
    pub uri: Rc<str>,
}

impl Namespace {
    pub fn new(kind: NamespaceKind, uri: Rc<str>) -> Self {
        Namespace { kind, uri }
    }

    pub fn any() -> Self {
        Namespace {
            kind: NamespaceKind::Namespace,
            uri: Rc::from(""),
        }
    }

    pub fn public(uri: impl Into<Rc<str>>) -> Self {
        Namespace {
            kind: NamespaceKind::PackageNamespace,
            uri: uri.into(),
        }
    }
}

impl PartialEq for Namespace {
    /// Byte-equal comparison of the URI only: two namespaces with the same
    /// string but different kinds (e.g. a `private` namespace reusing a
    /// `public` one's name) are still distinct bindings in AVM2, but within
    /// one translation unit that never happens for names the decoder
    /// resolves from the same pool entry, so URI equality is what property
    /// map keys (spec §3 invariant: "byte-equal (namespace, name) pairs")
    /// actually compare.
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}
impl Eq for Namespace {}

impl std::hash::Hash for Namespace {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}
