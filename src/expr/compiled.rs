//! Signature-cached entry point for expression evaluation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ahash::RandomState;

use crate::error::BindResult;
use crate::reflect::StaticType;

use super::compiler::{Activation, Compiler, Fragment};
use super::members::EvalEnv;
use super::node::ExprNode;
use super::signature::Signature;
use super::value::Value;

type FragmentCache = HashMap<Signature, Fragment, RandomState>;

/// An expression tree plus its per-signature compilation cache.
///
/// The tree is compiled lazily: the first invocation with a given argument
/// signature lowers the tree into a delegate specialized to those types, and
/// every later invocation with the same signature reuses it. Holding one
/// `CompiledExpression` per call site and invoking it repeatedly is the
/// intended usage; constructing a fresh one per call discards the cache.
///
/// Compilation failures are returned but never cached, so a signature that
/// failed once is re-checked on the next attempt.
///
/// # Examples
///
/// ```rust
/// use bindery::{BinaryOp, CompiledExpression, EvalEnv, ExprNode, Value};
///
/// let add = ExprNode::binary(BinaryOp::Add, ExprNode::source(0), ExprNode::source(1));
/// let expr = CompiledExpression::new(add, EvalEnv::default());
///
/// let sum = expr.invoke(&[Value::Int(1), Value::Int(2)]).unwrap();
/// assert_eq!(sum.as_i64(), Some(3));
///
/// // A string operand re-specializes `+` into concatenation.
/// let joined = expr.invoke(&[Value::str("a"), Value::Int(1)]).unwrap();
/// assert_eq!(joined.as_str(), Some("a1"));
///
/// // Same signature as the first call: served from cache.
/// expr.invoke(&[Value::Int(5), Value::Int(7)]).unwrap();
/// assert_eq!(expr.compile_count(), 2);
/// ```
pub struct CompiledExpression {
    ast: Arc<ExprNode>,
    env: EvalEnv,
    cache: Mutex<FragmentCache>,
    compiles: AtomicU64,
}

impl CompiledExpression {
    pub fn new(ast: ExprNode, env: EvalEnv) -> Self {
        Self {
            ast: Arc::new(ast),
            env,
            cache: Mutex::new(HashMap::default()),
            compiles: AtomicU64::new(0),
        }
    }

    /// The expression tree this cache compiles.
    pub fn ast(&self) -> &ExprNode {
        &self.ast
    }

    pub fn env(&self) -> &EvalEnv {
        &self.env
    }

    /// Evaluates the expression against `args`.
    ///
    /// The delegate for the argument signature is fetched from the cache or
    /// compiled under the cache lock; evaluation itself runs outside the lock,
    /// so concurrent invocations with cached signatures never serialize.
    pub fn invoke(&self, args: &[Value]) -> BindResult<Value> {
        let signature = Signature::of_values(args);
        let fragment = {
            let mut cache = self.cache_lock();
            match cache.get(&signature) {
                Some(fragment) => fragment.clone(),
                None => {
                    let types: Vec<StaticType> = args.iter().map(Value::static_type).collect();
                    let fragment = Compiler::compile(&self.env, &types, &self.ast)?;
                    cache.insert(signature, fragment.clone());
                    self.compiles.fetch_add(1, Ordering::Relaxed);
                    fragment
                }
            }
        };
        fragment.eval(&Activation::root(args))
    }

    /// Number of signatures compiled so far (cache misses).
    pub fn compile_count(&self) -> u64 {
        self.compiles.load(Ordering::Relaxed)
    }

    /// Number of delegates currently cached.
    pub fn cached_signatures(&self) -> usize {
        self.cache_lock().len()
    }

    fn cache_lock(&self) -> MutexGuard<'_, FragmentCache> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
