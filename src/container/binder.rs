//! Fluent binding builders.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::binding::{Binding, ConditionFn};
use crate::container::{ActivationContext, ServiceContainer};
use crate::key::{key_of_trait, key_of_type, ResolveRequest};
use crate::lifetime::Lifetime;

/// Fluent builder for a concrete type binding.
///
/// Created by [`ServiceContainer::bind`]. Filters are stacked first, then a
/// terminal method (`to_instance`, `to_singleton`, `to_transient`) appends
/// the binding. Dropping the builder without calling a terminal method
/// registers nothing.
///
/// # Examples
///
/// ```
/// use bindery::{Resolver, ServiceContainer};
///
/// let container = ServiceContainer::new();
/// container.bind::<u32>().named("port").to_instance(8080);
/// container.bind::<u32>().named("retries").to_instance(3);
///
/// assert_eq!(*container.get_named::<u32>("port").unwrap(), 8080);
/// assert_eq!(*container.get_named::<u32>("retries").unwrap(), 3);
/// ```
#[must_use = "a binder registers nothing until a to_* method is called"]
pub struct Binder<'c, T: Send + Sync + 'static> {
    container: &'c ServiceContainer,
    name: Option<&'static str>,
    condition: Option<ConditionFn>,
    metadata: Option<Arc<dyn Any + Send + Sync>>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: Send + Sync + 'static> Binder<'c, T> {
    pub(crate) fn new(container: &'c ServiceContainer) -> Self {
        Self {
            container,
            name: None,
            condition: None,
            metadata: None,
            _marker: PhantomData,
        }
    }

    /// Restricts the binding to requests made under `name`.
    ///
    /// A named binding never matches an unnamed request, and an unnamed
    /// binding never matches a named one.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Restricts the binding with a request predicate.
    ///
    /// The predicate runs at selection time against each [`ResolveRequest`];
    /// it must be cheap and must not resolve through the container. When
    /// several surviving bindings match one request the resolution fails
    /// with an ambiguity error rather than picking one.
    ///
    /// # Examples
    ///
    /// ```
    /// use bindery::{Resolver, ServiceContainer};
    ///
    /// let container = ServiceContainer::new();
    /// container.bind::<String>()
    ///     .named("greeting")
    ///     .when(|req| req.params().is_some())
    ///     .to_instance("parameterized".to_string());
    ///
    /// // Without parameters the predicate rejects the binding.
    /// assert!(container.get_named::<String>("greeting").is_err());
    /// ```
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ResolveRequest) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(predicate));
        self
    }

    /// Attaches opaque metadata, retrievable through binding descriptors.
    pub fn with_metadata<M: Any + Send + Sync>(mut self, metadata: M) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Binds a constant value. Constants are singletons by construction.
    pub fn to_instance(self, value: T) {
        let mut binding = Binding::instance(Arc::new(value));
        binding.name = self.name;
        binding.condition = self.condition;
        binding.metadata = self.metadata;
        self.container.append_binding(key_of_type::<T>(), binding);
        self.container.register_type_synthesizer::<T>();
    }

    /// Binds a lazily built singleton.
    ///
    /// The factory runs at most once, on first resolution; afterwards the
    /// closure is dropped and every resolution shares the memoized value.
    pub fn to_singleton<F>(self, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> T + Send + Sync + 'static,
    {
        self.finish_factory(Lifetime::Singleton, factory);
    }

    /// Binds a factory invoked on every resolution.
    pub fn to_transient<F>(self, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> T + Send + Sync + 'static,
    {
        self.finish_factory(Lifetime::Transient, factory);
    }

    fn finish_factory<F>(self, lifetime: Lifetime, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> T + Send + Sync + 'static,
    {
        let mut binding = Binding::factory(
            lifetime,
            Arc::new(move |ctx: &ActivationContext<'_>| {
                Ok(Arc::new(factory(ctx)) as crate::binding::AnyArc)
            }),
        );
        binding.name = self.name;
        binding.condition = self.condition;
        binding.metadata = self.metadata;
        self.container.append_binding(key_of_type::<T>(), binding);
        self.container.register_type_synthesizer::<T>();
    }
}

/// Fluent builder for a trait object binding.
///
/// Created by [`ServiceContainer::bind_trait`]. Mirrors [`Binder`] but the
/// terminal methods take and produce `Arc<T>` trait objects.
///
/// # Examples
///
/// ```
/// use bindery::{Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// trait Transport: Send + Sync {
///     fn scheme(&self) -> &str;
/// }
///
/// struct Tcp;
/// impl Transport for Tcp {
///     fn scheme(&self) -> &str { "tcp" }
/// }
///
/// struct Tls;
/// impl Transport for Tls {
///     fn scheme(&self) -> &str { "tls" }
/// }
///
/// let container = ServiceContainer::new();
/// container.bind_trait::<dyn Transport>().to_instance(Arc::new(Tcp));
/// container.bind_trait::<dyn Transport>()
///     .named("secure")
///     .to_instance(Arc::new(Tls));
///
/// assert_eq!(container.get_trait::<dyn Transport>().unwrap().scheme(), "tcp");
/// assert_eq!(
///     container.get_named_trait::<dyn Transport>("secure").unwrap().scheme(),
///     "tls"
/// );
/// ```
#[must_use = "a binder registers nothing until a to_* method is called"]
pub struct TraitBinder<'c, T: ?Sized + Send + Sync + 'static> {
    container: &'c ServiceContainer,
    name: Option<&'static str>,
    condition: Option<ConditionFn>,
    metadata: Option<Arc<dyn Any + Send + Sync>>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<'c, T: ?Sized + Send + Sync + 'static> TraitBinder<'c, T> {
    pub(crate) fn new(container: &'c ServiceContainer) -> Self {
        Self {
            container,
            name: None,
            condition: None,
            metadata: None,
            _marker: PhantomData,
        }
    }

    /// Restricts the binding to requests made under `name`.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Restricts the binding with a request predicate.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ResolveRequest) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(predicate));
        self
    }

    /// Attaches opaque metadata, retrievable through binding descriptors.
    pub fn with_metadata<M: Any + Send + Sync>(mut self, metadata: M) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Binds a constant trait object.
    pub fn to_instance(self, value: Arc<T>) {
        // Double-wrapped so the unsized Arc<T> travels as a sized Any
        let mut binding = Binding::instance(Arc::new(value));
        binding.name = self.name;
        binding.condition = self.condition;
        binding.metadata = self.metadata;
        self.container.append_binding(key_of_trait::<T>(), binding);
        self.container.register_trait_synthesizer::<T>();
    }

    /// Binds a lazily built singleton trait object.
    pub fn to_singleton<F>(self, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        self.finish_factory(Lifetime::Singleton, factory);
    }

    /// Binds a trait object factory invoked on every resolution.
    pub fn to_transient<F>(self, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        self.finish_factory(Lifetime::Transient, factory);
    }

    fn finish_factory<F>(self, lifetime: Lifetime, factory: F)
    where
        F: Fn(&ActivationContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        let mut binding = Binding::factory(
            lifetime,
            Arc::new(move |ctx: &ActivationContext<'_>| {
                Ok(Arc::new(factory(ctx)) as crate::binding::AnyArc)
            }),
        );
        binding.name = self.name;
        binding.condition = self.condition;
        binding.metadata = self.metadata;
        self.container.append_binding(key_of_trait::<T>(), binding);
        self.container.register_trait_synthesizer::<T>();
    }
}
