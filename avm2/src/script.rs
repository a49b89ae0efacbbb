//! `TranslationUnit`: the runtime wrapper around one decoded [`abc::AbcFile`].
//!
//! The decoder hands back plain, 1-indexed `Vec`s (`abc::ConstantPool`); nothing
//! in `abc` interns strings or resolves a namespace's name index into an
//! actual string. `TranslationUnit` is where that happens, lazily and once
//! per index, the first time a given constant is resolved into a runtime
//! name — mirroring the teacher's `avm2::script::TranslationUnit`, whose
//! `strings: Vec<Option<AvmString>>` cache works the same way.
//!
//! It also builds, once at construction, the `method_index -> method_body
//! table index` map spec §4.6 calls for ("build method → method_body
//! index"), since the ABC format stores bodies in their own table rather
//! than inline with `method_info`.

use crate::namespace::Namespace;
use abc::AbcFile;
use std::cell::RefCell;
use std::rc::Rc;

pub struct TranslationUnit {
    abc: Rc<AbcFile>,
    strings: RefCell<Vec<Option<Rc<str>>>>,
    namespaces: RefCell<Vec<Option<Namespace>>>,
    body_by_method: Vec<Option<u32>>,
}

impl TranslationUnit {
    pub fn new(abc: Rc<AbcFile>) -> Self {
        let mut body_by_method = vec![None; abc.methods.len()];
        for (body_index, body) in abc.method_bodies.iter().enumerate() {
            if let Some(slot) = body_by_method.get_mut(body.method_index as usize) {
                *slot = Some(body_index as u32);
            }
        }

        let string_count = abc.constant_pool.strings.len();
        let namespace_count = abc.constant_pool.namespaces.len();
        TranslationUnit {
            abc,
            strings: RefCell::new(vec![None; string_count]),
            namespaces: RefCell::new(vec![None; namespace_count]),
            body_by_method,
        }
    }

    pub fn abc(&self) -> &AbcFile {
        &self.abc
    }

    pub fn body_index_for_method(&self, method_index: u32) -> Option<u32> {
        self.body_by_method.get(method_index as usize).copied().flatten()
    }

    /// Interns and caches constant-pool string `index`. Index 0 resolves to
    /// the empty-string sentinel every time, uncached (it never needs to
    /// be, it's a `'static`-equivalent constant).
    pub fn pool_string(&self, index: u32) -> Rc<str> {
        if index == 0 {
            return Rc::from("");
        }
        let slot = index as usize - 1;
        if let Some(Some(cached)) = self.strings.borrow().get(slot) {
            return cached.clone();
        }
        let resolved: Rc<str> = Rc::from(self.abc.constant_pool.string(index));
        if let Some(entry) = self.strings.borrow_mut().get_mut(slot) {
            *entry = Some(resolved.clone());
        }
        resolved
    }

    pub fn pool_namespace(&self, index: u32) -> Namespace {
        if index == 0 {
            return Namespace::any();
        }
        let slot = index as usize - 1;
        if let Some(Some(cached)) = self.namespaces.borrow().get(slot) {
            return cached.clone();
        }
        let raw = self.abc.constant_pool.namespace(index);
        let uri = self.pool_string(raw.name_index);
        let resolved = Namespace::new(raw.kind, uri);
        if let Some(entry) = self.namespaces.borrow_mut().get_mut(slot) {
            *entry = Some(resolved.clone());
        }
        resolved
    }

    /// All candidate namespaces named by a namespace-set constant, in set
    /// order (spec §4.4: "try each namespace in set order").
    pub fn pool_namespace_set(&self, index: u32) -> Vec<Namespace> {
        self.abc
            .constant_pool
            .namespace_set(index)
            .namespaces
            .iter()
            .map(|&ns_index| self.pool_namespace(ns_index))
            .collect()
    }

    /// The class index whose instance initializer is `method_index`, used by
    /// `constructsuper` to find which level of the hierarchy is currently
    /// being constructed (spec §4.5.2). A linear scan: class counts are
    /// small and this only runs once per `constructsuper`, not per call.
    pub fn class_index_for_instance_init(&self, method_index: u32) -> Option<u32> {
        self.abc
            .instances
            .iter()
            .position(|instance| instance.instance_init_index == method_index)
            .map(|index| index as u32)
    }

    /// Resolves a `QName`/`QNameA` multiname whose namespace and name are
    /// both fixed at decode time, e.g. the exception table's `exc_type`,
    /// a class's name multiname, or a trait's declared name. Other
    /// multiname kinds (runtime-qualified, multiple-namespace) need the
    /// operand stack and/or a search list, so they go through
    /// `crate::resolver` instead.
    pub fn resolve_qname(&self, multiname_index: u32) -> Option<(Namespace, Rc<str>)> {
        match self.abc.constant_pool.multiname(multiname_index)? {
            abc::Multiname::QName { namespace_index, name_index }
            | abc::Multiname::QNameA { namespace_index, name_index } => {
                Some((self.pool_namespace(*namespace_index), self.pool_string(*name_index)))
            }
            _ => None,
        }
    }
}
