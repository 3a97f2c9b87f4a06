//! Resolver traits for service resolution.

use std::sync::Arc;
use crate::error::BindResult;
use crate::key::ResolveRequest;
use crate::traits::{Dispose, AsyncDispose};
use crate::internal::dispose_bag::BoxFutureUnit;

/// Core resolver trait for object-safe service resolution.
///
/// This trait provides the fundamental resolution capabilities that are
/// object-safe (can be used as trait objects). It handles the low-level
/// mechanics including the full resolution order (own bindings, parent chain,
/// structural fallbacks) and cyclic dependency detection through thread-local
/// stacks.
///
/// Most users should use the [`Resolver`] trait instead, which provides more
/// ergonomic generic methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single binding matching the request.
    ///
    /// Applies the conditional matching rule (names, predicates), walks the
    /// parent chain on a miss, then tries structural fallbacks. More than one
    /// surviving candidate is an `AmbiguousBinding` error.
    ///
    /// # Arguments
    ///
    /// * `request` - The service key plus optional binding name
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The resolved instance wrapped in `Arc<dyn Any>`
    /// * `Err(BindError)` - Resolution error (not found, ambiguous, circular, etc.)
    fn resolve_any(&self, request: &ResolveRequest) -> BindResult<Arc<dyn std::any::Any + Send + Sync>>;

    /// Resolves every binding matching the request, in registration order.
    ///
    /// Returns an empty vector when nothing matches anywhere in the chain;
    /// ambiguity does not apply since all matches are returned.
    ///
    /// # Arguments
    ///
    /// * `request` - The service key plus optional binding name
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<AnyArc>)` - All resolved instances as `Arc<dyn Any>`
    /// * `Err(BindError)` - Resolution error for any instance
    fn resolve_many(&self, request: &ResolveRequest) -> BindResult<Vec<Arc<dyn std::any::Any + Send + Sync>>>;

    /// Reports whether the request could be satisfied, without building anything.
    ///
    /// True when a binding matches in this container or its parent chain, or
    /// a structural fallback would apply. Factories are not invoked.
    fn probe(&self, request: &ResolveRequest) -> bool;

    /// Depth backstop applied to resolutions started from this resolver.
    fn max_resolve_depth(&self) -> usize {
        crate::container::DEFAULT_MAX_RESOLVE_DEPTH
    }

    /// Registers a synchronous disposal hook.
    ///
    /// Used internally by factories to register disposal callbacks that will
    /// be executed when the owning container is disposed.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous disposal hook.
    ///
    /// Used internally by factories to register async disposal callbacks that
    /// will be executed when the owning container is disposed.
    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>);
}

/// High-level resolver interface with generic methods for type-safe resolution.
///
/// This trait provides the main API that users interact with for resolving
/// services. It builds on [`ResolverCore`] to offer type-safe generic methods
/// that handle the complexities of type erasure and casting internally.
///
/// Both `ServiceContainer` and `ActivationContext` implement this trait,
/// making them interchangeable for resolution: factories receive an
/// `ActivationContext` and resolve their dependencies through the same
/// methods callers use on the container itself.
///
/// # Examples
///
/// ```
/// use bindery::{ServiceContainer, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) {
///         println!("LOG: {}", msg);
///     }
/// }
///
/// let container = ServiceContainer::new();
/// container.bind_instance(42usize);
/// container.bind_trait_instance::<dyn Logger>(Arc::new(ConsoleLogger));
///
/// // Resolve concrete types
/// let number = container.get_required::<usize>();
/// assert_eq!(*number, 42);
///
/// // Resolve trait objects
/// let logger = container.get_required_trait::<dyn Logger>();
/// logger.log("resolved");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    ///
    /// Returns the instance wrapped in an `Arc` for thread-safe sharing.
    /// Exactly one binding must match the unnamed request.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The concrete service type to resolve
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<T>)` - The resolved instance
    /// * `Err(BindError)` - Resolution error (not found, ambiguous, circular, etc.)
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_instance("configuration".to_string());
    ///
    /// let config = container.get::<String>().unwrap();
    /// assert_eq!(&*config, "configuration");
    /// ```
    fn get<T: 'static + Send + Sync>(&self) -> BindResult<Arc<T>> {
        let request = ResolveRequest::of_type::<T>();
        let any = self.resolve_any(&request)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a concrete service type under a binding name.
    ///
    /// Only bindings carrying the same name are considered; unnamed bindings
    /// never match a named request.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind::<u32>().named("port").to_instance(8080);
    /// container.bind::<u32>().named("retries").to_instance(3);
    ///
    /// assert_eq!(*container.get_named::<u32>("port").unwrap(), 8080);
    /// assert_eq!(*container.get_named::<u32>("retries").unwrap(), 3);
    /// assert!(container.get::<u32>().is_err()); // unnamed sees neither
    /// ```
    fn get_named<T: 'static + Send + Sync>(&self, name: &'static str) -> BindResult<Arc<T>> {
        let request = ResolveRequest::of_type::<T>().named(name);
        let any = self.resolve_any(&request)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a concrete service type with activation parameters.
    ///
    /// Parameters are visible to the selected binding's factory through
    /// [`ActivationContext::param`](crate::ActivationContext::param); they do
    /// not flow into dependencies the factory resolves.
    fn get_with<T: 'static + Send + Sync>(&self, params: crate::params::ActivationParams) -> BindResult<Arc<T>> {
        let request = ResolveRequest::of_type::<T>().with_params(params);
        let any = self.resolve_any(&request)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a named binding with activation parameters.
    fn get_named_with<T: 'static + Send + Sync>(
        &self,
        name: &'static str,
        params: crate::params::ActivationParams,
    ) -> BindResult<Arc<T>> {
        let request = ResolveRequest::of_type::<T>().named(name).with_params(params);
        let any = self.resolve_any(&request)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a trait object binding.
    ///
    /// Exactly one binding must match the unnamed request. For accessing all
    /// implementations, use [`get_all_trait`](Self::get_all_trait).
    ///
    /// # Type Parameters
    ///
    /// * `T` - The trait type to resolve (can be unsized with `?Sized`)
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Database: Send + Sync {
    ///     fn connect(&self) -> &str;
    /// }
    ///
    /// struct PostgresDb;
    /// impl Database for PostgresDb {
    ///     fn connect(&self) -> &str { "postgres://..." }
    /// }
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_trait_instance::<dyn Database>(Arc::new(PostgresDb));
    ///
    /// let db = container.get_trait::<dyn Database>().unwrap();
    /// assert_eq!(db.connect(), "postgres://...");
    /// ```
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> BindResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let request = ResolveRequest::of_trait::<T>();
        let any = self.resolve_any(&request)?;
        // Trait objects are stored as Arc<Arc<dyn Trait>>; unwrap one level
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a trait object binding under a binding name.
    fn get_named_trait<T: ?Sized + 'static + Send + Sync>(&self, name: &'static str) -> BindResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let request = ResolveRequest::of_trait::<T>().named(name);
        let any = self.resolve_any(&request)?;
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves every binding for a concrete service type.
    ///
    /// Returns all matching instances in registration order. Containers with
    /// no matching bindings fall back to the parent chain; when nothing
    /// matches anywhere the result is an empty vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_instance(1u8);
    /// container.bind_instance(2u8);
    /// container.bind_instance(3u8);
    ///
    /// let all: Vec<u8> = container.get_all::<u8>().unwrap().iter().map(|v| **v).collect();
    /// assert_eq!(all, vec![1, 2, 3]);
    /// ```
    fn get_all<T: 'static + Send + Sync>(&self) -> BindResult<Vec<Arc<T>>> {
        let request = ResolveRequest::of_type::<T>();
        let anys = self.resolve_many(&request)?;

        let mut results = Vec::with_capacity(anys.len());
        for any in anys {
            let arc = any.downcast::<T>()
                .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))?;
            results.push(arc);
        }
        Ok(results)
    }

    /// Resolves every binding for a trait.
    ///
    /// Returns all implementations bound for trait `T` in the order they
    /// were registered. This is useful for collecting all implementations of
    /// a plugin interface.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Plugin: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct PluginA;
    /// impl Plugin for PluginA {
    ///     fn name(&self) -> &str { "Plugin A" }
    /// }
    ///
    /// struct PluginB;
    /// impl Plugin for PluginB {
    ///     fn name(&self) -> &str { "Plugin B" }
    /// }
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_trait_instance::<dyn Plugin>(Arc::new(PluginA));
    /// container.bind_trait_instance::<dyn Plugin>(Arc::new(PluginB));
    ///
    /// let plugins = container.get_all_trait::<dyn Plugin>().unwrap();
    /// assert_eq!(plugins.len(), 2);
    /// assert_eq!(plugins[0].name(), "Plugin A");
    /// assert_eq!(plugins[1].name(), "Plugin B");
    /// ```
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> BindResult<Vec<Arc<T>>>
    where
        Arc<T>: 'static,
    {
        let request = ResolveRequest::of_trait::<T>();
        let anys = self.resolve_many(&request)?;

        let mut results = Vec::with_capacity(anys.len());
        for any in anys {
            // Trait objects are stored as Arc<Arc<dyn Trait>>; unwrap one level
            let arc = any.downcast::<Arc<T>>()
                .map(|boxed| (*boxed).clone())
                .map_err(|_| crate::error::BindError::TypeMismatch(std::any::type_name::<T>()))?;
            results.push(arc);
        }
        Ok(results)
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// This is a convenience method that calls [`get`](Self::get) and panics
    /// if the service cannot be resolved. Use this when you're certain the
    /// binding exists and want to fail fast on configuration errors.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved (not found, ambiguous,
    /// circular dependency, etc.).
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_instance(42usize);
    ///
    /// let number = container.get_required::<usize>(); // Will panic if not found
    /// assert_eq!(*number, 42);
    /// ```
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait object binding, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the trait cannot be resolved (not found, ambiguous,
    /// circular dependency, etc.).
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Reports whether a concrete service type could be resolved.
    ///
    /// No factories run and nothing is cached; this only inspects bindings,
    /// the parent chain, and structural fallbacks.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{ServiceContainer, Resolver};
    ///
    /// let container = ServiceContainer::new();
    /// assert!(!container.can_resolve::<String>());
    ///
    /// container.bind_instance("ready".to_string());
    /// assert!(container.can_resolve::<String>());
    /// ```
    fn can_resolve<T: 'static + Send + Sync>(&self) -> bool {
        self.probe(&ResolveRequest::of_type::<T>())
    }

    /// Reports whether a named binding for a concrete type could be resolved.
    fn can_resolve_named<T: 'static + Send + Sync>(&self, name: &'static str) -> bool {
        self.probe(&ResolveRequest::of_type::<T>().named(name))
    }

    /// Reports whether a trait object binding could be resolved.
    fn can_resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> bool {
        self.probe(&ResolveRequest::of_trait::<T>())
    }

    /// Registers a service for synchronous disposal.
    ///
    /// This method should be called from factories to ensure proper cleanup
    /// when the owning container is disposed. Disposal hooks execute in LIFO
    /// order (last registered, first disposed).
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{Dispose, ServiceContainer, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Cache {
    ///     name: String,
    /// }
    ///
    /// impl Dispose for Cache {
    ///     fn dispose(&self) {
    ///         println!("Disposing cache: {}", self.name);
    ///     }
    /// }
    ///
    /// let container = ServiceContainer::new();
    /// container.bind_singleton(|ctx| {
    ///     let cache = Arc::new(Cache { name: "user_cache".to_string() });
    ///     ctx.register_disposer(cache.clone());
    ///     Cache { name: "user_cache".to_string() }
    /// });
    /// ```
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers a service for asynchronous disposal.
    ///
    /// This method should be called from factories to ensure proper async
    /// cleanup when the owning container is disposed. Hooks of both kinds
    /// execute in LIFO order (last registered, first disposed).
    fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.push_async_disposer(Box::new(move || Box::pin(async move {
            service.dispose().await;
        })));
    }
}
