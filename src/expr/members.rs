//! Member lookup environment for expression compilation.
//!
//! Member access resolves through three tiers: an ordered chain of
//! [`MemberProvider`]s, then the [`TypeRegistry`], and finally the value's own
//! [`DynamicAccess`](super::value::DynamicAccess) implementation. The first
//! two tiers are consulted here; [`EvalEnv`] bundles them so compiled
//! fragments can re-probe at runtime when static types are unknown.

use std::any::TypeId;
use std::sync::Arc;

use crate::reflect::{MethodDescriptor, PropertyDescriptor, TypeRegistry};

/// Source of binding members consulted before the type registry.
///
/// Providers let hosts layer synthetic members over any type without touching
/// its registration: attached properties, computed bridge members, or
/// adapter-supplied methods. Providers earlier in the chain win.
pub trait MemberProvider: Send + Sync {
    /// Property under `name` for the target type, if this provider has one.
    fn property(&self, target: TypeId, name: &str) -> Option<PropertyDescriptor>;

    /// Method overloads under `name` for the target type. Returning `None`
    /// (or an empty set) defers to the next tier.
    fn methods(&self, target: TypeId, name: &str) -> Option<Vec<MethodDescriptor>> {
        let _ = (target, name);
        None
    }

    /// Indexer overloads for the target type.
    fn indexers(&self, target: TypeId) -> Option<Vec<MethodDescriptor>> {
        let _ = target;
        None
    }
}

/// Everything the compiler needs to resolve members and free functions.
///
/// Cloning is cheap (handles only); a compiled expression keeps its own clone
/// so delegates stay valid however long the host caches them.
///
/// # Examples
///
/// ```rust
/// use bindery::{EvalEnv, TypeRegistry};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let env = EvalEnv::new(registry.clone());
/// assert!(Arc::ptr_eq(env.registry(), &registry));
/// ```
#[derive(Clone)]
pub struct EvalEnv {
    registry: Arc<TypeRegistry>,
    providers: Vec<Arc<dyn MemberProvider>>,
}

impl EvalEnv {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            providers: Vec::new(),
        }
    }

    /// Appends a provider to the chain, builder style.
    pub fn with_provider(mut self, provider: Arc<dyn MemberProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Appends a provider to the chain.
    pub fn add_provider(&mut self, provider: Arc<dyn MemberProvider>) {
        self.providers.push(provider);
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Property lookup: provider chain first, registry second.
    pub(crate) fn find_property(&self, target: TypeId, name: &str) -> Option<PropertyDescriptor> {
        for provider in &self.providers {
            if let Some(property) = provider.property(target, name) {
                return Some(property);
            }
        }
        self.registry
            .describe(target)
            .and_then(|info| info.property(name).cloned())
    }

    /// Method lookup: first provider with a non-empty answer wins, then the
    /// registry.
    pub(crate) fn find_methods(&self, target: TypeId, name: &str) -> Vec<MethodDescriptor> {
        for provider in &self.providers {
            if let Some(methods) = provider.methods(target, name) {
                if !methods.is_empty() {
                    return methods;
                }
            }
        }
        self.registry
            .describe(target)
            .map(|info| info.methods(name).to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn find_indexers(&self, target: TypeId) -> Vec<MethodDescriptor> {
        for provider in &self.providers {
            if let Some(indexers) = provider.indexers(target) {
                if !indexers.is_empty() {
                    return indexers;
                }
            }
        }
        self.registry
            .describe(target)
            .map(|info| info.indexers().to_vec())
            .unwrap_or_default()
    }

    pub(crate) fn find_functions(&self, name: &str) -> Vec<MethodDescriptor> {
        self.registry.functions(name)
    }

    /// Display name for a target type, falling back to the kind label.
    pub(crate) fn type_label(&self, target: TypeId, fallback: &'static str) -> String {
        match self.registry.type_name(target) {
            Some(name) => name.to_string(),
            None => fallback.to_string(),
        }
    }
}

impl Default for EvalEnv {
    fn default() -> Self {
        Self::new(Arc::new(TypeRegistry::new()))
    }
}
