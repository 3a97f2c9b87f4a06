//! Core traits for the service container.

mod dispose;
mod injectable;
mod resolver;

pub use dispose::{Dispose, AsyncDispose};
pub use injectable::Injectable;
pub use resolver::{Resolver, ResolverCore};
