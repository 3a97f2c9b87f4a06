//! Dynamic service container with hierarchical resolution.
//!
//! The container maps service keys to ordered binding lists, resolves
//! through parent chains, synthesizes collections, and guards every
//! resolution against cyclic dependency graphs.

mod binder;
mod context;
mod module;
pub(crate) mod store;

pub use binder::{Binder, TraitBinder};
pub use context::ActivationContext;
pub use module::ContainerModule;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use crate::binding::{AnyArc, Binding, CtorFn};
use crate::error::{BindError, BindResult};
use crate::internal::dispose_bag::BoxFutureUnit;
use crate::internal::{with_circular_catch, DisposeBag};
use crate::key::{key_of_trait, key_of_type, ResolveRequest, ServiceKey};
use crate::observer::{Observers, ResolutionObserver};
use crate::params::ActivationParams;
use crate::traits::{Injectable, Resolver, ResolverCore};
use store::{has_match, select_all, select_one, BindingStore, StoreSnapshot};

/// Default backstop for the length of a single resolution chain.
///
/// Cyclic graphs are normally caught by the repeat-entry check; the depth
/// limit exists so pathologically deep (but acyclic) graphs fail with a
/// clear error instead of overflowing the stack.
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 256;

/// Construction options for a [`ServiceContainer`].
///
/// # Examples
///
/// ```
/// use bindery::{ContainerOptions, ServiceContainer};
///
/// let options = ContainerOptions::new()
///     .with_lock_free_reads(true)
///     .with_max_resolve_depth(64);
///
/// let container = ServiceContainer::with_options(options);
/// assert!(container.options().lock_free_reads);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContainerOptions {
    /// Serve lookups from immutable store snapshots instead of taking the
    /// store lock on every read.
    ///
    /// Snapshots are rebuilt lazily after a mutation, so read-heavy
    /// workloads with rare binds resolve without lock contention. A
    /// resolution may observe the store as it was at snapshot time if it
    /// races a concurrent bind; the next read after the rebuild sees the
    /// mutation.
    pub lock_free_reads: bool,
    /// Depth backstop for a single resolution chain.
    pub max_resolve_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            lock_free_reads: false,
            max_resolve_depth: DEFAULT_MAX_RESOLVE_DEPTH,
        }
    }
}

impl ContainerOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables snapshot-based reads.
    pub fn with_lock_free_reads(mut self, enabled: bool) -> Self {
        self.lock_free_reads = enabled;
        self
    }

    /// Overrides the resolution depth backstop.
    pub fn with_max_resolve_depth(mut self, depth: usize) -> Self {
        self.max_resolve_depth = depth;
        self
    }
}

struct ContainerInner {
    store: Mutex<BindingStore>,
    /// Mirror of the store version, readable without the store lock.
    store_version: AtomicU64,
    /// Cached snapshot for lock-free reads; rebuilt when the version moves.
    snapshot: RwLock<Arc<StoreSnapshot>>,
    parent: Option<ServiceContainer>,
    options: ContainerOptions,
    observers: Observers,
    disposers: Mutex<DisposeBag>,
}

/// Dynamic service container with named, conditional, and hierarchical
/// bindings.
///
/// A container maps service types (and trait objects) to ordered lists of
/// bindings. Binding is append-only per key: registering a second binding
/// for a type adds a candidate instead of replacing the first, and a plain
/// [`get`](Resolver::get) over several surviving candidates is a hard
/// ambiguity error. Candidates are told apart by binding names and request
/// predicates.
///
/// `ServiceContainer` is a cheaply cloneable handle; clones share the same
/// bindings, caches, and disposal bag. All methods take `&self`, so a
/// container can be shared across threads behind a plain clone.
///
/// # Resolution order
///
/// 1. Bindings registered on this container.
/// 2. The parent chain, when any ancestor has a matching binding. The
///    ancestor activates with itself as the resolver, so a parent
///    singleton never captures child-local dependencies.
/// 3. Structural fallbacks: `Vec<Arc<T>>` synthesis for any bound `T`,
///    and [`Injectable`] self-construction via [`resolve`](Self::resolve).
///
/// # Examples
///
/// ```
/// use bindery::{Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Pool { url: String }
///
/// let container = ServiceContainer::new();
/// container.bind_instance(Config { url: "postgres://localhost".into() });
/// container.bind_singleton(|ctx| Pool {
///     url: ctx.get_required::<Config>().url.clone(),
/// });
///
/// let pool = container.get::<Pool>().unwrap();
/// assert_eq!(pool.url, "postgres://localhost");
///
/// // Singletons memoize across handles.
/// let again = container.clone().get::<Pool>().unwrap();
/// assert!(Arc::ptr_eq(&pool, &again));
/// ```
pub struct ServiceContainer {
    inner: Arc<ContainerInner>,
}

impl Clone for ServiceContainer {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceContainer {
    /// Creates an empty root container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty root container with the given options.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                store: Mutex::new(BindingStore::new()),
                store_version: AtomicU64::new(0),
                snapshot: RwLock::new(Arc::new(StoreSnapshot::empty())),
                parent: None,
                options,
                observers: Observers::new(),
                disposers: Mutex::new(DisposeBag::default()),
            }),
        }
    }

    /// Creates a child container that falls back to this one.
    ///
    /// The child starts empty and inherits the parent's options. Bindings
    /// registered on the child shadow the parent's for requests entering
    /// the child; requests the child cannot satisfy walk up the chain.
    /// Disposal is per container: disposing the child leaves the parent's
    /// resources alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{Resolver, ServiceContainer};
    ///
    /// let root = ServiceContainer::new();
    /// root.bind_instance("root".to_string());
    ///
    /// let child = root.create_child();
    /// assert_eq!(&*child.get::<String>().unwrap(), "root");
    ///
    /// child.bind_instance("child".to_string());
    /// assert_eq!(&*child.get::<String>().unwrap(), "child");
    /// assert_eq!(&*root.get::<String>().unwrap(), "root");
    /// ```
    pub fn create_child(&self) -> ServiceContainer {
        Self {
            inner: Arc::new(ContainerInner {
                store: Mutex::new(BindingStore::new()),
                store_version: AtomicU64::new(0),
                snapshot: RwLock::new(Arc::new(StoreSnapshot::empty())),
                parent: Some(self.clone()),
                options: self.inner.options,
                observers: Observers::new(),
                disposers: Mutex::new(DisposeBag::default()),
            }),
        }
    }

    /// The parent this container falls back to, if any.
    pub fn parent(&self) -> Option<ServiceContainer> {
        self.inner.parent.clone()
    }

    /// The options this container was built with.
    pub fn options(&self) -> ContainerOptions {
        self.inner.options
    }

    /// Starts a fluent binding for a concrete type.
    ///
    /// See [`Binder`] for the filters and terminal methods.
    pub fn bind<T: Send + Sync + 'static>(&self) -> Binder<'_, T> {
        Binder::new(self)
    }

    /// Starts a fluent binding for a trait object.
    ///
    /// See [`TraitBinder`] for the filters and terminal methods.
    pub fn bind_trait<T: ?Sized + Send + Sync + 'static>(&self) -> TraitBinder<'_, T> {
        TraitBinder::new(self)
    }

    /// Binds a constant value.
    ///
    /// Constants are singletons by construction; every resolution shares
    /// the value bound here.
    pub fn bind_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.bind::<T>().to_instance(value);
    }

    /// Binds a lazily built singleton.
    ///
    /// The factory runs at most once, on first resolution. After a
    /// successful build the closure is dropped, releasing anything it
    /// captured.
    pub fn bind_singleton<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ActivationContext<'_>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().to_singleton(factory);
    }

    /// Binds a factory invoked on every resolution.
    pub fn bind_transient<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ActivationContext<'_>) -> T + Send + Sync + 'static,
    {
        self.bind::<T>().to_transient(factory);
    }

    /// Binds a constant trait object.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{Resolver, ServiceContainer};
    /// use std::sync::Arc;
    ///
    /// trait Cache: Send + Sync {
    ///     fn get(&self, key: &str) -> Option<String>;
    /// }
    ///
    /// struct MemoryCache;
    /// impl Cache for MemoryCache {
    ///     fn get(&self, _key: &str) -> Option<String> { None }
    /// }
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_trait_instance::<dyn Cache>(Arc::new(MemoryCache));
    ///
    /// let cache = container.get_trait::<dyn Cache>().unwrap();
    /// assert!(cache.get("missing").is_none());
    /// ```
    pub fn bind_trait_instance<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) {
        self.bind_trait::<T>().to_instance(value);
    }

    /// Binds a lazily built singleton trait object.
    pub fn bind_singleton_trait<T, F>(&self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ActivationContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        self.bind_trait::<T>().to_singleton(factory);
    }

    /// Binds a trait object factory invoked on every resolution.
    pub fn bind_transient_trait<T, F>(&self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ActivationContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        self.bind_trait::<T>().to_transient(factory);
    }

    /// Removes every binding for a concrete type from this container.
    ///
    /// Returns whether anything was removed. Only this container's own
    /// bindings are touched; the parent chain is unaffected, so a request
    /// made after the unbind may still resolve through an ancestor.
    /// Memoized singletons already handed out stay alive with their
    /// holders.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{Resolver, ServiceContainer};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_instance(1u32);
    /// container.bind::<u32>().named("alt").to_instance(2);
    ///
    /// // Removes the whole list, named bindings included.
    /// assert!(container.unbind::<u32>());
    /// assert!(!container.unbind::<u32>());
    /// assert!(container.get::<u32>().is_err());
    /// assert!(container.get_named::<u32>("alt").is_err());
    /// ```
    pub fn unbind<T: Send + Sync + 'static>(&self) -> bool {
        self.remove_key(&key_of_type::<T>())
    }

    /// Removes every binding for a trait object from this container.
    pub fn unbind_trait<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.remove_key(&key_of_trait::<T>())
    }

    /// Installs a [`ContainerModule`], returning `&self` for chaining.
    pub fn install<M: ContainerModule>(&self, module: M) -> BindResult<&Self> {
        module.configure(self)?;
        Ok(self)
    }

    /// Resolves `T`, building it through [`Injectable`] when unbound.
    ///
    /// A matching binding always wins; the constructor fallback only runs
    /// on `BindingNotFound`. Fallback construction is not memoized: each
    /// call builds a fresh instance, and [`can_resolve`](Resolver::can_resolve)
    /// does not report constructor-only types.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ActivationContext, BindResult, Injectable, Resolver, ServiceContainer};
    /// use std::sync::Arc;
    ///
    /// struct Database { url: String }
    ///
    /// struct Repository { db: Arc<Database> }
    ///
    /// impl Injectable for Repository {
    ///     fn build(ctx: &ActivationContext<'_>) -> BindResult<Self> {
    ///         Ok(Repository { db: ctx.dep::<Database>()? })
    ///     }
    /// }
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_instance(Database { url: "sqlite://:memory:".into() });
    ///
    /// // No binding for Repository; its constructor runs instead.
    /// let repo = container.resolve::<Repository>().unwrap();
    /// assert_eq!(repo.db.url, "sqlite://:memory:");
    /// ```
    pub fn resolve<T: Injectable>(&self) -> BindResult<Arc<T>> {
        match self.get::<T>() {
            Ok(value) => Ok(value),
            Err(BindError::BindingNotFound(_)) => self.activate_unbound::<T>(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves `T` with activation parameters, building it through
    /// [`Injectable`] when unbound.
    ///
    /// Parameters reach the selected binding's factory, or the fallback
    /// constructor, through [`ActivationContext::param`]. They do not flow
    /// into nested dependency resolutions.
    pub fn resolve_with<T: Injectable>(&self, params: ActivationParams) -> BindResult<Arc<T>> {
        match self.get_with::<T>(params.clone()) {
            Ok(value) => Ok(value),
            Err(BindError::BindingNotFound(_)) => self.activate_unbound::<T>(Some(params)),
            Err(e) => Err(e),
        }
    }

    /// Registers a resolution observer on this container.
    ///
    /// Observers see every resolution entering this container, nested
    /// dependency lookups included. Resolutions a child delegates to its
    /// parent are reported to the child's observers, not the parent's.
    pub fn add_observer(&self, observer: Arc<dyn ResolutionObserver>) {
        self.inner.observers.add(observer);
    }

    /// Runs every registered disposal hook in LIFO order.
    ///
    /// Hooks are registered by factories through
    /// [`register_disposer`](Resolver::register_disposer) and
    /// [`register_async_disposer`](Resolver::register_async_disposer).
    /// Only this container's hooks run; parents and children each own
    /// their own bag. Calling this twice is a no-op the second time.
    pub async fn dispose_all(&self) {
        let mut bag = {
            let mut guard = self.lock_disposers();
            std::mem::take(&mut *guard)
        };
        bag.run_all_reverse().await;
    }

    // ---- registration plumbing -------------------------------------------

    pub(crate) fn append_binding(&self, key: ServiceKey, binding: Binding) {
        let mut store = self.lock_store();
        store.insert(key, binding);
        self.inner.store_version.store(store.version(), Ordering::Release);
    }

    /// Registers the `Vec<Arc<T>>` fallback for a concrete element type.
    pub(crate) fn register_type_synthesizer<T: Send + Sync + 'static>(&self) {
        let ctor: CtorFn = Arc::new(|ctx: &ActivationContext<'_>| {
            let all = ctx.get_all::<T>()?;
            Ok(Arc::new(all) as AnyArc)
        });
        self.add_synthesizer(key_of_type::<Vec<Arc<T>>>(), ctor);
    }

    /// Registers the `Vec<Arc<T>>` fallback for a trait element type.
    pub(crate) fn register_trait_synthesizer<T: ?Sized + Send + Sync + 'static>(&self) {
        let ctor: CtorFn = Arc::new(|ctx: &ActivationContext<'_>| {
            let all = ctx.get_all_trait::<T>()?;
            Ok(Arc::new(all) as AnyArc)
        });
        self.add_synthesizer(key_of_type::<Vec<Arc<T>>>(), ctor);
    }

    fn add_synthesizer(&self, key: ServiceKey, ctor: CtorFn) {
        let mut store = self.lock_store();
        store.add_synthesizer(key, ctor);
        self.inner.store_version.store(store.version(), Ordering::Release);
    }

    fn remove_key(&self, key: &ServiceKey) -> bool {
        let mut store = self.lock_store();
        let removed = store.remove(key);
        self.inner.store_version.store(store.version(), Ordering::Release);
        removed
    }

    pub(crate) fn with_store<R>(&self, f: impl FnOnce(&BindingStore) -> R) -> R {
        f(&self.lock_store())
    }

    fn lock_store(&self) -> MutexGuard<'_, BindingStore> {
        match self.inner.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_disposers(&self) -> MutexGuard<'_, DisposeBag> {
        match self.inner.disposers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ---- resolution pipeline ---------------------------------------------

    fn parent_ref(&self) -> Option<&ServiceContainer> {
        self.inner.parent.as_ref()
    }

    /// Returns the cached snapshot, rebuilding it when the store moved.
    fn current_snapshot(&self) -> Arc<StoreSnapshot> {
        let version = self.inner.store_version.load(Ordering::Acquire);
        {
            let guard = match self.inner.snapshot.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if guard.version == version {
                return guard.clone();
            }
        }

        let mut guard = match self.inner.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Double-check: another writer may have rebuilt while we waited
        let version = self.inner.store_version.load(Ordering::Acquire);
        if guard.version != version {
            let fresh = self.lock_store().snapshot();
            *guard = Arc::new(fresh);
        }
        guard.clone()
    }

    /// Selects this container's single matching binding, if any.
    ///
    /// Predicates never run under the store lock: the locked path clones
    /// the candidate list out first, the lock-free path reads a snapshot.
    fn lookup_one(&self, request: &ResolveRequest) -> BindResult<Option<Binding>> {
        if self.inner.options.lock_free_reads {
            let snapshot = self.current_snapshot();
            select_one(snapshot.list(request.key()), request)
        } else {
            let list = { self.lock_store().cloned_list(request.key()) };
            match list {
                Some(list) => select_one(&list, request),
                None => Ok(None),
            }
        }
    }

    fn lookup_all(&self, request: &ResolveRequest) -> Vec<Binding> {
        if self.inner.options.lock_free_reads {
            let snapshot = self.current_snapshot();
            select_all(snapshot.list(request.key()), request)
        } else {
            let list = { self.lock_store().cloned_list(request.key()) };
            match list {
                Some(list) => select_all(&list, request),
                None => Vec::new(),
            }
        }
    }

    fn own_has_match(&self, request: &ResolveRequest) -> bool {
        if self.inner.options.lock_free_reads {
            let snapshot = self.current_snapshot();
            has_match(snapshot.list(request.key()), request)
        } else {
            let list = { self.lock_store().cloned_list(request.key()) };
            list.map(|list| has_match(&list, request)).unwrap_or(false)
        }
    }

    /// True when this container or any ancestor has a matching binding.
    fn chain_has_binding(&self, request: &ResolveRequest) -> bool {
        if self.own_has_match(request) {
            return true;
        }
        match self.parent_ref() {
            Some(parent) => parent.chain_has_binding(request),
            None => false,
        }
    }

    fn own_synthesizer(&self, key: &ServiceKey) -> Option<CtorFn> {
        if self.inner.options.lock_free_reads {
            self.current_snapshot().synthesizer(key)
        } else {
            self.lock_store().synthesizer(key)
        }
    }

    /// Finds the nearest structural fallback, own first, then ancestors.
    fn find_synthesizer(&self, key: &ServiceKey) -> Option<CtorFn> {
        if let Some(ctor) = self.own_synthesizer(key) {
            return Some(ctor);
        }
        self.parent_ref().and_then(|p| p.find_synthesizer(key))
    }

    fn resolve_any_impl(&self, request: &ResolveRequest) -> BindResult<AnyArc> {
        // Own bindings win over everything else.
        if let Some(binding) = self.lookup_one(request)? {
            let ctx = ActivationContext::new(self, request);
            return binding.activate(&ctx);
        }

        // Delegate to the parent chain only when an ancestor actually has a
        // matching binding; the ancestor resolves with itself, so its
        // singletons never capture child-local state.
        if let Some(parent) = self.parent_ref() {
            if parent.chain_has_binding(request) {
                return parent.resolve_any_impl(request);
            }
        }

        // Structural fallback, run with this container as the resolver so
        // synthesized collections see child bindings first. Names opt out:
        // a named request either matches a real binding or fails.
        if request.name().is_none() {
            if let Some(ctor) = self.find_synthesizer(request.key()) {
                let ctx = ActivationContext::new(self, request);
                return ctor(&ctx);
            }
        }

        Err(BindError::BindingNotFound(request.display_name()))
    }

    fn resolve_many_impl(&self, request: &ResolveRequest) -> BindResult<Vec<AnyArc>> {
        let matched = self.lookup_all(request);
        if !matched.is_empty() {
            let ctx = ActivationContext::new(self, request);
            let mut out = Vec::with_capacity(matched.len());
            for binding in matched {
                out.push(binding.activate(&ctx)?);
            }
            return Ok(out);
        }
        if let Some(parent) = self.parent_ref() {
            return parent.resolve_many_impl(request);
        }
        Ok(Vec::new())
    }

    fn probe_impl(&self, request: &ResolveRequest) -> bool {
        if self.chain_has_binding(request) {
            return true;
        }
        request.name().is_none() && self.find_synthesizer(request.key()).is_some()
    }

    /// Builds an unbound `Injectable` through its constructor.
    fn activate_unbound<T: Injectable>(&self, params: Option<ActivationParams>) -> BindResult<Arc<T>> {
        let request = match params {
            Some(params) => ResolveRequest::of_type::<T>().with_params(params),
            None => ResolveRequest::of_type::<T>(),
        };
        let depth = self.inner.options.max_resolve_depth;
        self.observed(&request, || {
            with_circular_catch(std::any::type_name::<T>(), None, depth, || {
                let ctx = ActivationContext::new(self, &request);
                Ok(Arc::new(T::build(&ctx)?))
            })
        })
    }

    /// Wraps a resolution with observer notifications when any are attached.
    fn observed<T>(
        &self,
        request: &ResolveRequest,
        f: impl FnOnce() -> BindResult<T>,
    ) -> BindResult<T> {
        if !self.inner.observers.has_observers() {
            return f();
        }
        self.inner.observers.resolving(request);
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => self.inner.observers.resolved(request, elapsed),
            Err(error) => self.inner.observers.resolve_failed(request, error, elapsed),
        }
        result
    }
}

impl ResolverCore for ServiceContainer {
    fn resolve_any(&self, request: &ResolveRequest) -> BindResult<AnyArc> {
        let depth = self.inner.options.max_resolve_depth;
        self.observed(request, || {
            with_circular_catch(request.display_name(), request.name(), depth, || {
                self.resolve_any_impl(request)
            })
        })
    }

    fn resolve_many(&self, request: &ResolveRequest) -> BindResult<Vec<AnyArc>> {
        let depth = self.inner.options.max_resolve_depth;
        self.observed(request, || {
            with_circular_catch(request.display_name(), request.name(), depth, || {
                self.resolve_many_impl(request)
            })
        })
    }

    fn probe(&self, request: &ResolveRequest) -> bool {
        self.probe_impl(request)
    }

    fn max_resolve_depth(&self) -> usize {
        self.inner.options.max_resolve_depth
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.lock_disposers().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.lock_disposers().push_async(move || f());
    }
}

impl Resolver for ServiceContainer {}

impl Drop for ServiceContainer {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) != 1 {
            return;
        }
        let pending = self.lock_disposers().len();
        if pending > 0 {
            eprintln!(
                "[bindery] ServiceContainer dropped with {} undisposed resource(s). \
                 Call dispose_all().await before dropping.",
                pending
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Config {
        name: &'static str,
    }

    #[test]
    fn own_bindings_shadow_parent_bindings() {
        let root = ServiceContainer::new();
        root.bind_instance(Config { name: "root" });

        let child = root.create_child();
        assert_eq!(child.get::<Config>().unwrap().name, "root");

        child.bind_instance(Config { name: "child" });
        assert_eq!(child.get::<Config>().unwrap().name, "child");
        assert_eq!(root.get::<Config>().unwrap().name, "root");
    }

    #[test]
    fn vec_synthesis_collects_element_bindings() {
        let container = ServiceContainer::new();
        container.bind_instance(1u16);
        container.bind_instance(2u16);

        let vec = container.get::<Vec<Arc<u16>>>().unwrap();
        let values: Vec<u16> = vec.iter().map(|v| **v).collect();
        assert_eq!(values, vec![1, 2]);

        // The fallback survives an unbind and synthesizes an empty list
        assert!(container.unbind::<u16>());
        let vec = container.get::<Vec<Arc<u16>>>().unwrap();
        assert!(vec.is_empty());
    }

    #[test]
    fn named_requests_skip_vec_synthesis() {
        let container = ServiceContainer::new();
        container.bind_instance(1u16);
        assert!(container.get_named::<Vec<Arc<u16>>>("batch").is_err());
        assert!(!container.can_resolve_named::<Vec<Arc<u16>>>("batch"));
    }

    #[test]
    fn probe_reports_chain_and_fallbacks() {
        let root = ServiceContainer::new();
        let child = root.create_child();

        assert!(!child.can_resolve::<Config>());
        root.bind_instance(Config { name: "root" });
        assert!(child.can_resolve::<Config>());
        // Vec synthesis registered by the bind is visible from the child
        assert!(child.can_resolve::<Vec<Arc<Config>>>());
    }

    #[test]
    fn lock_free_reads_see_later_bindings() {
        let container =
            ServiceContainer::with_options(ContainerOptions::new().with_lock_free_reads(true));
        assert!(container.get::<u64>().is_err());

        container.bind_instance(5u64);
        assert_eq!(*container.get::<u64>().unwrap(), 5);

        container.bind::<u64>().named("alt").to_instance(6);
        assert_eq!(*container.get_named::<u64>("alt").unwrap(), 6);
        // The unnamed binding is still the only unnamed candidate
        assert_eq!(*container.get::<u64>().unwrap(), 5);
    }

    #[test]
    fn parent_singleton_is_shared_with_children() {
        let root = ServiceContainer::new();
        root.bind_singleton(|_| Config { name: "shared" });

        let a = root.create_child();
        let b = root.create_child();
        let from_a = a.get::<Config>().unwrap();
        let from_b = b.get::<Config>().unwrap();
        assert!(Arc::ptr_eq(&from_a, &from_b));
    }
}
