//! Runtime values flowing through compiled binding expressions.
//!
//! [`Value`] is the dynamically typed currency of the expression engine: every
//! source slot, operator, member access, and method call produces one. All
//! payload variants are cheap to clone (`Arc` internally), so compiled
//! fragments hand values around freely without copying payloads.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::reflect::StaticType;

/// Marker backing [`Value::Null`]'s runtime type identity.
pub(crate) struct NullMarker;

/// Last-resort member access implemented by the value itself.
///
/// Objects wrapped with [`Value::dynamic`] are consulted directly when neither
/// a member provider nor the type registry knows the requested member. This is
/// the third tier of member resolution and the only one that can answer for
/// members invented at runtime (dictionaries, late-bound view models, and the
/// like).
///
/// # Examples
///
/// ```rust
/// use bindery::{DynamicAccess, Value};
/// use std::any::Any;
///
/// struct Bag(Vec<(String, Value)>);
///
/// impl DynamicAccess for Bag {
///     fn get_member(&self, name: &str) -> Option<Value> {
///         self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let bag = Value::dynamic(Bag(vec![("answer".to_string(), Value::Int(42))]));
/// assert!(matches!(bag, Value::Dyn(_)));
/// ```
pub trait DynamicAccess: Send + Sync + 'static {
    /// Resolves a member by name, or `None` when the object has no such member.
    fn get_member(&self, name: &str) -> Option<Value>;

    /// Resolves an indexed access. The default has no indexer.
    fn get_index(&self, key: &Value) -> Option<Value> {
        let _ = key;
        None
    }

    /// Short label used in diagnostics.
    fn type_label(&self) -> &'static str {
        "dynamic"
    }

    /// Upcast so registry members registered for the concrete type can serve
    /// dynamically wrapped instances too.
    fn as_any(&self) -> &dyn Any;
}

/// Callable value produced by a lambda node or supplied by the host.
///
/// Compiled lambda fragments capture their enclosing source values and locals
/// at the moment the lambda expression is evaluated; hosts can also construct
/// one directly to pass native behavior into an expression.
pub struct LambdaValue {
    arity: usize,
    call: Box<dyn Fn(&[Value]) -> BindResult<Value> + Send + Sync>,
}

impl LambdaValue {
    /// Wraps a host closure taking exactly `arity` arguments.
    pub fn new<F>(arity: usize, call: F) -> Self
    where
        F: Fn(&[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        Self {
            arity,
            call: Box::new(call),
        }
    }

    /// Number of arguments the lambda expects.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Calls the lambda, failing when the argument count does not match.
    pub fn invoke(&self, args: &[Value]) -> BindResult<Value> {
        if args.len() != self.arity {
            return Err(BindError::ActivationFailed(format!(
                "lambda expects {} argument(s), got {}",
                self.arity,
                args.len()
            )));
        }
        (self.call)(args)
    }
}

impl fmt::Debug for LambdaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LambdaValue(arity={})", self.arity)
    }
}

/// Dynamically typed expression value.
///
/// The variants cover the scalar kinds the operator lowering understands
/// natively plus two object flavors: [`Value::Obj`] for opaque host payloads
/// whose members come from the registry or member providers, and
/// [`Value::Dyn`] for payloads that answer member lookups themselves.
///
/// # Examples
///
/// ```rust
/// use bindery::Value;
///
/// let v = Value::str("hello");
/// assert_eq!(v.as_str(), Some("hello"));
/// assert!(Value::Int(3).loose_eq(&Value::Float(3.0)));
/// ```
#[derive(Clone)]
pub enum Value {
    /// Absent value. Concatenates as the empty string and equals only itself.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Immutable string payload.
    Str(Arc<str>),
    /// Heterogeneous list with built-in integer indexing.
    List(Arc<Vec<Value>>),
    /// Callable value.
    Lambda(Arc<LambdaValue>),
    /// Opaque host object; members resolved through providers and the registry.
    Obj(Arc<dyn Any + Send + Sync>),
    /// Self-describing host object; consulted as the final member-access tier.
    Dyn(Arc<dyn DynamicAccess>),
}

impl Value {
    /// Builds a string value.
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Builds a list value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Wraps a host object as an opaque payload.
    pub fn obj<T: Send + Sync + 'static>(value: T) -> Self {
        Value::Obj(Arc::new(value))
    }

    /// Wraps an already-shared host object as an opaque payload.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Value::Obj(value)
    }

    /// Wraps a self-describing object consulted by the dynamic member tier.
    pub fn dynamic<T: DynamicAccess>(value: T) -> Self {
        Value::Dyn(Arc::new(value))
    }

    /// `TypeId` of the runtime payload.
    ///
    /// Scalar variants report stable marker types; `Obj` and `Dyn` report the
    /// concrete payload type. Signatures are derived from these ids, so two
    /// argument lists compile to the same delegate exactly when every slot
    /// carries the same runtime type.
    pub fn runtime_type(&self) -> TypeId {
        match self {
            Value::Null => TypeId::of::<NullMarker>(),
            Value::Bool(_) => TypeId::of::<bool>(),
            Value::Int(_) => TypeId::of::<i64>(),
            Value::Float(_) => TypeId::of::<f64>(),
            Value::Str(_) => TypeId::of::<str>(),
            Value::List(_) => TypeId::of::<Vec<Value>>(),
            Value::Lambda(_) => TypeId::of::<LambdaValue>(),
            Value::Obj(o) => (**o).type_id(),
            Value::Dyn(d) => d.as_any().type_id(),
        }
    }

    /// Static classification used by the per-signature compiler.
    pub fn static_type(&self) -> StaticType {
        match self {
            Value::Null => StaticType::Null,
            Value::Bool(_) => StaticType::Bool,
            Value::Int(_) => StaticType::Int,
            Value::Float(_) => StaticType::Float,
            Value::Str(_) => StaticType::Str,
            Value::List(_) => StaticType::List,
            Value::Lambda(_) => StaticType::Lambda,
            Value::Obj(o) => StaticType::Obj((**o).type_id()),
            Value::Dyn(d) => StaticType::Dyn(d.as_any().type_id()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view, widening `Int` to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the payload of an `Obj` or `Dyn` value as a concrete type.
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Obj(o) => o.downcast_ref::<T>(),
            Value::Dyn(d) => d.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Clones out the shared payload of an `Obj` value.
    pub fn downcast_obj<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self {
            Value::Obj(o) => o.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Short kind label for diagnostics.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Lambda(_) => "lambda",
            Value::Obj(_) => "object",
            Value::Dyn(d) => d.type_label(),
        }
    }

    /// Loose equality used by the `==`/`!=` operators.
    ///
    /// Numbers compare across `Int`/`Float`, strings by content, lists
    /// elementwise, and object payloads by shared identity. Mismatched kinds
    /// are unequal rather than an error.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            (Value::Obj(a), Value::Obj(b)) => Arc::ptr_eq(a, b),
            (Value::Dyn(a), Value::Dyn(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Appends the string-concatenation rendering of this value.
    ///
    /// `Null` contributes nothing, mirroring how string concatenation treats
    /// absent operands; everything else renders its display form.
    pub(crate) fn concat_into(&self, out: &mut String) {
        use std::fmt::Write;
        match self {
            Value::Null => {}
            other => {
                let _ = write!(out, "{}", other);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Lambda(l) => write!(f, "<lambda/{}>", l.arity()),
            Value::Obj(_) => write!(f, "<object>"),
            Value::Dyn(d) => write!(f, "<{}>", d.type_label()),
        }
    }
}

// Manual because `dyn Any` payloads are not Debug.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Lambda(l) => write!(f, "Lambda(arity={})", l.arity()),
            Value::Obj(_) => write!(f, "Obj(..)"),
            Value::Dyn(d) => write!(f, "Dyn({})", d.type_label()),
        }
    }
}
