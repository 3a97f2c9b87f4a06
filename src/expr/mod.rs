//! Binding expressions: dynamically typed trees compiled per argument
//! signature.
//!
//! An [`ExprNode`] tree describes a computation over source values without
//! naming Rust types. [`CompiledExpression`] owns such a tree and lowers it
//! lazily: the first invocation with a given [`Signature`] of argument types
//! compiles a specialized delegate, later invocations with the same signature
//! reuse it. Member access on object payloads resolves through the
//! [`EvalEnv`], which chains [`MemberProvider`]s over a
//! [`TypeRegistry`](crate::reflect::TypeRegistry); values that implement
//! [`DynamicAccess`] answer for themselves when neither tier knows the member.

pub(crate) mod compiled;
pub(crate) mod compiler;
pub(crate) mod members;
pub(crate) mod node;
pub(crate) mod overload;
pub(crate) mod signature;
pub(crate) mod value;

pub use compiled::CompiledExpression;
pub use members::{EvalEnv, MemberProvider};
pub use node::{BinaryOp, ExprNode, UnaryOp};
pub use signature::Signature;
pub use value::{DynamicAccess, LambdaValue, Value};
