//! Binding lifecycle definitions.

/// Binding lifecycles controlling instance caching behavior
///
/// Defines how bound instances are created, cached, and shared within a
/// service container. Constant bindings are singletons by construction:
/// the value supplied at bind time is the memoized instance.
///
/// # Lifecycle Characteristics
///
/// - **Singleton**: One instance per binding, cached forever
/// - **Transient**: New instance per resolution, never cached
///
/// # Examples
///
/// ```rust
/// use bindery::{Lifetime, Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let container = ServiceContainer::new();
///
/// // Singleton: one instance, built lazily on first request
/// container.bind_singleton(|_| Database {
///     url: "postgres://localhost".to_string(),
/// });
///
/// // Transient: new instance every time
/// container.bind_transient(|_| RequestModel { id: 12345 });
///
/// // Singleton: same instance across resolutions
/// let db1 = container.get::<Database>().unwrap();
/// let db2 = container.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Transient: always different instances
/// let model1 = container.get::<RequestModel>().unwrap();
/// let model2 = container.get::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per binding, cached forever
    ///
    /// Singleton bindings build their instance on first resolution and
    /// memoize it for the life of the binding. The same instance is shared
    /// across all threads and all child containers that resolve through the
    /// owning container. After the first successful build the factory
    /// closure is dropped, releasing anything it captured.
    Singleton,
    /// New instance per resolution, never cached
    ///
    /// Transient bindings invoke their factory on every resolution, even
    /// for repeated requests from the same caller. No caching is performed.
    /// Best for lightweight, stateless services where fresh instances
    /// are preferred over caching overhead.
    Transient,
}
