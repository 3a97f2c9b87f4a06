//! Activation context for factory and constructor code.
//!
//! This module contains the ActivationContext type which provides
//! the interface factories and `Injectable` constructors use to resolve
//! their dependencies and read activation parameters.

use std::any::Any;
use std::sync::Arc;

use crate::error::BindResult;
use crate::key::ResolveRequest;
use crate::params::ActivationParams;
use crate::traits::{Resolver, ResolverCore};

/// Context passed to factories for resolving dependencies.
///
/// ActivationContext borrows the resolving container and the request that
/// triggered the activation. Factories pull dependencies through the same
/// [`Resolver`] methods callers use on the container, and read any named
/// parameters the caller supplied with the request.
///
/// Dependency resolutions started from the context are fresh requests: they
/// carry no name and no parameters of their own.
///
/// # Examples
///
/// ```
/// use bindery::{Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = ServiceContainer::new();
/// container.bind_instance(Database {
///     url: "postgres://localhost".to_string()
/// });
/// container.bind_transient(|ctx| {
///     // ctx is an ActivationContext that provides access to other services
///     UserService {
///         db: ctx.get_required::<Database>(),
///     }
/// });
/// ```
pub struct ActivationContext<'a> {
    resolver: &'a dyn ResolverCore,
    request: Option<&'a ResolveRequest>,
}

impl<'a> ActivationContext<'a> {
    /// Creates a context for activating the given request.
    pub(crate) fn new(resolver: &'a dyn ResolverCore, request: &'a ResolveRequest) -> Self {
        Self { resolver, request: Some(request) }
    }

    /// Creates a context with no originating request (fallback construction).
    pub(crate) fn detached(resolver: &'a dyn ResolverCore) -> Self {
        Self { resolver, request: None }
    }

    /// The request that triggered this activation, if any.
    pub fn request(&self) -> Option<&ResolveRequest> {
        self.request
    }

    /// Looks up a named activation parameter, downcast to `P`.
    ///
    /// Returns `None` when the caller supplied no parameter under that name
    /// (or supplied one of a different type).
    pub fn param<P: Any + Send + Sync>(&self, name: &str) -> Option<Arc<P>> {
        self.request
            .and_then(|r| r.params())
            .and_then(|p| p.get::<P>(name))
    }

    /// Looks up a named activation parameter, erroring when absent.
    ///
    /// Use this for parameters the factory cannot default.
    pub fn required_param<P: Any + Send + Sync>(&self, name: &'static str) -> BindResult<Arc<P>> {
        self.param::<P>(name)
            .ok_or(crate::error::BindError::MissingParameter(name))
    }

    /// The full parameter set, when the caller supplied one.
    pub fn params(&self) -> Option<&ActivationParams> {
        self.request.and_then(|r| r.params())
    }

    /// Resolves a dependency; strict, fails when nothing is bound.
    ///
    /// Alias for [`Resolver::get`] reading better inside constructors.
    pub fn dep<T: 'static + Send + Sync>(&self) -> BindResult<Arc<T>> {
        self.get::<T>()
    }

    /// Resolves a named dependency.
    pub fn dep_named<T: 'static + Send + Sync>(&self, name: &'static str) -> BindResult<Arc<T>> {
        self.get_named::<T>(name)
    }

    /// Resolves every binding of a dependency; lenient, an unbound type
    /// yields an empty list.
    pub fn dep_all<T: 'static + Send + Sync>(&self) -> BindResult<Vec<Arc<T>>> {
        self.get_all::<T>()
    }

    /// Resolves a dependency, building it via [`Injectable`] when unbound.
    ///
    /// Mirrors [`ServiceContainer::resolve`](crate::ServiceContainer::resolve)
    /// so constructors can depend on other self-bindable types. The fallback
    /// construction participates in cycle detection: two constructors that
    /// activate each other error instead of recursing.
    ///
    /// [`Injectable`]: crate::Injectable
    pub fn activate<T: crate::traits::Injectable>(&self) -> BindResult<Arc<T>> {
        match self.get::<T>() {
            Ok(value) => Ok(value),
            Err(crate::error::BindError::BindingNotFound(_)) => {
                let depth = self.resolver.max_resolve_depth();
                crate::internal::with_circular_catch(std::any::type_name::<T>(), None, depth, || {
                    let ctx = ActivationContext::detached(self.resolver);
                    Ok(Arc::new(T::build(&ctx)?))
                })
            }
            Err(e) => Err(e),
        }
    }
}

impl<'a> ResolverCore for ActivationContext<'a> {
    fn resolve_any(&self, request: &ResolveRequest) -> BindResult<crate::binding::AnyArc> {
        self.resolver.resolve_any(request)
    }

    fn resolve_many(&self, request: &ResolveRequest) -> BindResult<Vec<crate::binding::AnyArc>> {
        self.resolver.resolve_many(request)
    }

    fn probe(&self, request: &ResolveRequest) -> bool {
        self.resolver.probe(request)
    }

    fn max_resolve_depth(&self) -> usize {
        self.resolver.max_resolve_depth()
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.resolver.push_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::dispose_bag::BoxFutureUnit + Send>) {
        self.resolver.push_async_disposer(f);
    }
}

impl<'a> Resolver for ActivationContext<'a> {
    fn register_disposer<T>(&self, service: Arc<T>)
    where
        T: crate::traits::Dispose + 'static,
    {
        self.resolver.push_sync_disposer(Box::new(move || service.dispose()));
    }

    fn register_async_disposer<T>(&self, service: Arc<T>)
    where
        T: crate::traits::AsyncDispose + 'static,
    {
        self.resolver.push_async_disposer(Box::new(move || {
            Box::pin(async move { service.dispose().await })
        }));
    }
}
