//! Modular binding registration.
//!
//! Groups of related bindings can be packaged as modules and installed
//! as a unit, keeping registration code next to the services it wires up.

use crate::container::ServiceContainer;
use crate::error::BindResult;

/// A reusable group of bindings installed into a container as a unit.
///
/// Each subsystem can implement this trait to provide its own
/// registrations; installation order follows the order of
/// [`install`](ServiceContainer::install) calls, so later modules may
/// layer named or conditional bindings over earlier ones.
///
/// # Example
///
/// ```rust
/// use bindery::{BindResult, ContainerModule, Resolver, ServiceContainer};
///
/// #[derive(Default)]
/// struct StorageConfig { path: String }
///
/// struct StorageEngine { path: String }
///
/// struct StorageModule { path: String }
///
/// impl ContainerModule for StorageModule {
///     fn configure(self, container: &ServiceContainer) -> BindResult<()> {
///         container.bind_instance(StorageConfig { path: self.path });
///         container.bind_singleton(|ctx| StorageEngine {
///             path: ctx.get_required::<StorageConfig>().path.clone(),
///         });
///         Ok(())
///     }
/// }
///
/// # fn main() -> BindResult<()> {
/// let container = ServiceContainer::new();
/// container.install(StorageModule { path: "/tmp/data".into() })?;
///
/// let engine = container.get::<StorageEngine>()?;
/// assert_eq!(engine.path, "/tmp/data");
/// # Ok(())
/// # }
/// ```
pub trait ContainerModule {
    /// Registers this module's bindings with the container.
    fn configure(self, container: &ServiceContainer) -> BindResult<()>;
}
