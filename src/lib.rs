//! # bindery
//!
//! Dynamic service container with hierarchical resolution and a
//! signature-cached binding-expression compiler.
//!
//! ## Features
//!
//! - **Dynamic bindings**: bind concrete types and trait objects at any time,
//!   with append-only binding lists and explicit ambiguity errors
//! - **Named and conditional bindings**: filter candidates by binding name or
//!   a predicate over the resolution request
//! - **Hierarchical containers**: child containers inherit parent bindings
//!   and shadow them locally
//! - **Circular dependency detection**: cycles fail with the complete
//!   dependency path instead of overflowing the stack
//! - **Lock-free reads**: optional snapshot mode serves read-heavy workloads
//!   without taking the store lock
//! - **Compiled expressions**: dynamically typed expression trees compiled
//!   once per argument-type signature and reused from a cache
//! - **Reflective member access**: an injectable [`TypeRegistry`] describes
//!   host types to the expression compiler, with provider and per-value
//!   fallbacks
//!
//! ## Quick Start
//!
//! ```rust
//! use bindery::{Resolver, ServiceContainer};
//! use std::sync::Arc;
//!
//! // Define your services
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! // Bind them
//! let container = ServiceContainer::new();
//! container.bind_instance(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! container.bind_transient(|ctx| UserService {
//!     db: ctx.get_required::<Database>(),
//! });
//!
//! // Resolve
//! let users = container.get_required::<UserService>();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Binding Lifetimes
//!
//! - **Singleton**: built at most once per container and shared; constants
//!   bound with `bind_instance` behave the same way
//! - **Transient**: built fresh on every resolution
//!
//! Request-style scoping comes from the hierarchy: create a child container
//! per unit of work, bind the per-request services there, and drop it when
//! the work finishes.
//!
//! ## Trait Resolution
//!
//! ```rust
//! use bindery::{Resolver, ServiceContainer};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("[LOG] {}", message);
//!     }
//! }
//!
//! let container = ServiceContainer::new();
//! container.bind_trait_instance::<dyn Logger>(Arc::new(ConsoleLogger));
//!
//! let logger = container.get_required_trait::<dyn Logger>();
//! logger.log("Hello, World!");
//! ```
//!
//! ## Binding Expressions
//!
//! Expression trees evaluate against source values whose types are only
//! known at invocation time. The first call with a given argument signature
//! compiles a specialized delegate; later calls with the same signature hit
//! the cache.
//!
//! ```rust
//! use bindery::{
//!     BinaryOp, CompiledExpression, EvalEnv, ExprNode, StaticType, TypeRegistry, Value,
//! };
//! use std::sync::Arc;
//!
//! struct Order {
//!     total: f64,
//! }
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register::<Order>(|t| {
//!     t.property("total", StaticType::Float, |o| Value::Float(o.total));
//! });
//!
//! // order.total * 1.2
//! let tree = ExprNode::binary(
//!     BinaryOp::Mul,
//!     ExprNode::member(ExprNode::source(0), "total"),
//!     ExprNode::constant(1.2f64),
//! );
//! let expr = CompiledExpression::new(tree, EvalEnv::new(registry));
//!
//! let order = Value::obj(Order { total: 10.0 });
//! assert_eq!(expr.invoke(&[order]).unwrap().as_f64(), Some(12.0));
//! assert_eq!(expr.compile_count(), 1);
//! ```

// Module declarations
pub mod container;
pub mod descriptors;
pub mod error;
pub mod expr;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod params;
pub mod reflect;
pub mod traits;

// Internal modules
mod binding;
mod internal;

// Re-export core types
pub use container::{
    ActivationContext, Binder, ContainerModule, ContainerOptions, ServiceContainer, TraitBinder,
    DEFAULT_MAX_RESOLVE_DEPTH,
};
pub use descriptors::BindingDescriptor;
pub use error::{BindError, BindResult};
pub use expr::{
    BinaryOp, CompiledExpression, DynamicAccess, EvalEnv, ExprNode, LambdaValue, MemberProvider,
    Signature, UnaryOp, Value,
};
pub use internal::CircularPanic;
pub use key::{key_of_type, ResolveRequest, ServiceKey};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, MetricsObserver, ResolutionObserver};
pub use params::ActivationParams;
pub use reflect::{
    MethodDescriptor, ParamType, PropertyDescriptor, StaticType, TypeBuilder, TypeInfo,
    TypeRegistry,
};
pub use traits::{AsyncDispose, Dispose, Injectable, Resolver, ResolverCore};
