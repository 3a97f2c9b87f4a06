//! Binding storage and read snapshots.

use std::collections::HashMap;

use ahash::RandomState;

use crate::binding::{Binding, CtorFn};
use crate::error::{BindError, BindResult};
use crate::key::{ResolveRequest, ServiceKey};

/// Mutable binding storage owned by one container.
///
/// Keys map to ordered binding lists; `insert` appends and `remove` drops
/// the whole list. Synthesizers are fallback constructors keyed like
/// bindings (collection synthesis registers one per element type). Every
/// mutation bumps `version` so cached snapshots know to rebuild.
///
/// The store hands out cloned lists rather than borrowed ones: selection
/// runs user predicates, and those must never execute under the store lock.
pub(crate) struct BindingStore {
    bindings: HashMap<ServiceKey, Vec<Binding>, RandomState>,
    synthesizers: HashMap<ServiceKey, CtorFn, RandomState>,
    version: u64,
}

impl BindingStore {
    pub(crate) fn new() -> Self {
        Self {
            bindings: HashMap::default(),
            synthesizers: HashMap::default(),
            version: 0,
        }
    }

    /// Appends a binding to the key's list.
    pub(crate) fn insert(&mut self, key: ServiceKey, binding: Binding) {
        self.bindings.entry(key).or_default().push(binding);
        self.version = self.version.wrapping_add(1);
    }

    /// Removes every binding for the key; reports whether any existed.
    ///
    /// Synthesizers stay: once a service type has been seen, collection
    /// requests for it keep synthesizing (an empty list after the unbind).
    pub(crate) fn remove(&mut self, key: &ServiceKey) -> bool {
        let removed = self.bindings.remove(key).is_some();
        if removed {
            self.version = self.version.wrapping_add(1);
        }
        removed
    }

    /// Registers a structural fallback unless one already exists.
    pub(crate) fn add_synthesizer(&mut self, key: ServiceKey, ctor: CtorFn) {
        if let std::collections::hash_map::Entry::Vacant(entry) = self.synthesizers.entry(key) {
            entry.insert(ctor);
            self.version = self.version.wrapping_add(1);
        }
    }

    pub(crate) fn synthesizer(&self, key: &ServiceKey) -> Option<CtorFn> {
        self.synthesizers.get(key).cloned()
    }

    pub(crate) fn synthesizer_count(&self) -> usize {
        self.synthesizers.len()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    /// Clones the binding list for a key; clones are `Arc` bumps.
    pub(crate) fn cloned_list(&self, key: &ServiceKey) -> Option<Vec<Binding>> {
        self.bindings.get(key).cloned()
    }

    /// Iterates all binding lists for introspection.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ServiceKey, &Vec<Binding>)> {
        self.bindings.iter()
    }

    /// Clones the current state into an immutable snapshot.
    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            bindings: self.bindings.clone(),
            synthesizers: self.synthesizers.clone(),
            version: self.version,
        }
    }
}

/// Immutable copy of a [`BindingStore`] used by lock-free reads.
///
/// Binding clones share their factory slots with the live store, so a
/// singleton activated through a snapshot is memoized exactly once no
/// matter which path reached it first.
pub(crate) struct StoreSnapshot {
    bindings: HashMap<ServiceKey, Vec<Binding>, RandomState>,
    synthesizers: HashMap<ServiceKey, CtorFn, RandomState>,
    pub(crate) version: u64,
}

impl StoreSnapshot {
    pub(crate) fn empty() -> Self {
        Self {
            bindings: HashMap::default(),
            synthesizers: HashMap::default(),
            // Stale before any read; the first lookup rebuilds from the store
            version: u64::MAX,
        }
    }

    pub(crate) fn list(&self, key: &ServiceKey) -> &[Binding] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn synthesizer(&self, key: &ServiceKey) -> Option<CtorFn> {
        self.synthesizers.get(key).cloned()
    }
}

/// Selects the single binding matching the request.
///
/// More than one survivor is a hard ambiguity error; the survivor is cloned
/// out so activation can run on it without further store access.
pub(crate) fn select_one(list: &[Binding], request: &ResolveRequest) -> BindResult<Option<Binding>> {
    let mut found: Option<&Binding> = None;
    let mut count = 0usize;
    for binding in list {
        if binding.matches(request) {
            count += 1;
            if found.is_none() {
                found = Some(binding);
            }
        }
    }
    match (found, count) {
        (None, _) => Ok(None),
        (Some(binding), 1) => Ok(Some(binding.clone())),
        (_, n) => Err(BindError::AmbiguousBinding(request.display_name(), n)),
    }
}

/// Selects every binding matching the request, in registration order.
pub(crate) fn select_all(list: &[Binding], request: &ResolveRequest) -> Vec<Binding> {
    list.iter().filter(|b| b.matches(request)).cloned().collect()
}

/// True when at least one binding matches the request.
pub(crate) fn has_match(list: &[Binding], request: &ResolveRequest) -> bool {
    list.iter().any(|b| b.matches(request))
}
