//! Self-bindable construction for concrete types.

use crate::container::ActivationContext;
use crate::error::BindResult;

/// Construction recipe for types the container may build without an explicit binding.
///
/// When a typed resolution finds no binding anywhere in the container chain,
/// [`ServiceContainer::resolve`](crate::ServiceContainer::resolve) falls back
/// to `Injectable::build` for the requested type. The construction is
/// transient: nothing is registered and every fallback resolution builds a
/// fresh instance.
///
/// Dependencies are pulled through the [`ActivationContext`], which also
/// carries any named parameter overrides supplied by the caller.
///
/// # Examples
///
/// ```
/// use bindery::{ActivationContext, BindResult, Injectable, Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
///
/// struct Repository {
///     db: Arc<Database>,
/// }
///
/// impl Injectable for Repository {
///     fn build(ctx: &ActivationContext) -> BindResult<Self> {
///         Ok(Repository { db: ctx.dep::<Database>()? })
///     }
/// }
///
/// let container = ServiceContainer::new();
/// container.bind_instance(Database { url: "postgres://localhost".to_string() });
///
/// // No Repository binding exists; the container builds it on demand.
/// let repo = container.resolve::<Repository>().unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Builds an instance from the activation context.
    fn build(ctx: &ActivationContext<'_>) -> BindResult<Self>;
}
