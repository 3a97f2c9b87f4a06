//! Runtime type descriptions backing reflective member access.
//!
//! The expression compiler never inspects host types directly; everything it
//! knows about an object's properties, methods, and indexers comes from a
//! [`TypeRegistry`]. The registry is an explicit object, built once during
//! composition and shared by handle, so two containers (or two tests) never
//! observe each other's registrations.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use ahash::RandomState;

use crate::error::{BindError, BindResult};
use crate::expr::value::{LambdaValue, NullMarker, Value};

/// Static classification of an expression fragment or value.
///
/// The compiler specializes each cached delegate to one argument signature, so
/// most fragments carry a known static type and operators can be lowered
/// directly. `Unknown` marks fragments whose type only exists at runtime (a
/// lambda parameter, or a member with no declared type); those defer their
/// checks to invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticType {
    /// Type only known at runtime; checks are deferred to invocation.
    Unknown,
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Lambda,
    /// Opaque object payload of the given type.
    Obj(TypeId),
    /// Self-describing object payload of the given type.
    Dyn(TypeId),
}

impl StaticType {
    /// Classification for an opaque payload of type `T`.
    pub fn of<T: 'static>() -> Self {
        StaticType::Obj(TypeId::of::<T>())
    }

    /// The `TypeId` member lookups are keyed by, or `None` for `Unknown`.
    pub fn type_id(self) -> Option<TypeId> {
        match self {
            StaticType::Unknown => None,
            StaticType::Null => Some(TypeId::of::<NullMarker>()),
            StaticType::Bool => Some(TypeId::of::<bool>()),
            StaticType::Int => Some(TypeId::of::<i64>()),
            StaticType::Float => Some(TypeId::of::<f64>()),
            StaticType::Str => Some(TypeId::of::<str>()),
            StaticType::List => Some(TypeId::of::<Vec<Value>>()),
            StaticType::Lambda => Some(TypeId::of::<LambdaValue>()),
            StaticType::Obj(id) | StaticType::Dyn(id) => Some(id),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, StaticType::Int | StaticType::Float)
    }

    /// Short kind label for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            StaticType::Unknown => "unknown",
            StaticType::Null => "null",
            StaticType::Bool => "bool",
            StaticType::Int => "int",
            StaticType::Float => "float",
            StaticType::Str => "string",
            StaticType::List => "list",
            StaticType::Lambda => "lambda",
            StaticType::Obj(_) => "object",
            StaticType::Dyn(_) => "dynamic",
        }
    }
}

/// Declared parameter kind used by overload scoring.
///
/// `Any` accepts every argument at a boxing penalty; the scalar kinds and
/// `Obj` demand their own shape, with `Int` arguments widening to `Float`
/// parameters at a small cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Accepts any value; scored with the boxing penalty.
    Any,
    Bool,
    Int,
    Float,
    Str,
    List,
    Lambda,
    /// Requires a payload of the given type.
    Obj(TypeId),
}

impl ParamType {
    /// Parameter requiring a payload of type `T`.
    pub fn of<T: 'static>() -> Self {
        ParamType::Obj(TypeId::of::<T>())
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamType::Any => "any",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Str => "string",
            ParamType::List => "list",
            ParamType::Lambda => "lambda",
            ParamType::Obj(_) => "object",
        }
    }
}

type GetterFn = Arc<dyn Fn(&Value) -> BindResult<Value> + Send + Sync>;
type InvokeFn = Arc<dyn Fn(&Value, &[Value]) -> BindResult<Value> + Send + Sync>;

/// Readable member of a registered type.
///
/// Properties carry a declared static type, so member access over them stays
/// statically typed in compiled delegates instead of degrading to runtime
/// dispatch.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    ty: StaticType,
    get: GetterFn,
}

impl PropertyDescriptor {
    /// Builds a descriptor from a raw getter over [`Value`].
    pub fn new<F>(name: impl Into<String>, ty: StaticType, get: F) -> Self
    where
        F: Fn(&Value) -> BindResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty,
            get: Arc::new(get),
        }
    }

    /// Builds a descriptor whose getter borrows the payload as `T`.
    pub fn for_payload<T, F>(name: impl Into<String>, ty: StaticType, get: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self {
            name,
            ty,
            get: Arc::new(move |target: &Value| {
                let payload = target.payload::<T>().ok_or_else(|| {
                    BindError::InvalidCast(format!(
                        "{} receiver for `{}`",
                        target.type_label(),
                        label
                    ))
                })?;
                Ok(get(payload))
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn static_type(&self) -> StaticType {
        self.ty
    }

    /// Reads the property off a target value.
    pub fn read(&self, target: &Value) -> BindResult<Value> {
        (self.get)(target)
    }
}

/// Callable member of a registered type, or a free function.
///
/// A descriptor declares its parameter shapes, variadic flag, and return type;
/// overload selection ranks all descriptors sharing a name and the compiled
/// delegate calls the winner's closure. Variadic descriptors treat the last
/// declared parameter as the element type of the packed tail.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParamType>,
    variadic: bool,
    returns: StaticType,
    invoke: InvokeFn,
}

impl MethodDescriptor {
    /// Builds a descriptor from a raw body over [`Value`] target and arguments.
    pub fn new<F>(
        name: impl Into<String>,
        params: &[ParamType],
        returns: StaticType,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: params.to_vec(),
            variadic: false,
            returns,
            invoke: Arc::new(body),
        }
    }

    /// Builds a descriptor whose body borrows the payload as `T`.
    pub fn for_payload<T, F>(
        name: impl Into<String>,
        params: &[ParamType],
        returns: StaticType,
        body: F,
    ) -> Self
    where
        T: 'static,
        F: Fn(&T, &[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self {
            name,
            params: params.to_vec(),
            variadic: false,
            returns,
            invoke: Arc::new(move |target: &Value, args: &[Value]| {
                let payload = target.payload::<T>().ok_or_else(|| {
                    BindError::InvalidCast(format!(
                        "{} receiver for `{}`",
                        target.type_label(),
                        label
                    ))
                })?;
                body(payload, args)
            }),
        }
    }

    /// Marks the last declared parameter as a variadic tail element.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn returns(&self) -> StaticType {
        self.returns
    }

    /// Calls the descriptor body. Free functions receive a `Null` target.
    pub fn invoke(&self, target: &Value, args: &[Value]) -> BindResult<Value> {
        (self.invoke)(target, args)
    }
}

/// Immutable member table for one registered type.
///
/// Snapshots handed out by [`TypeRegistry::describe`] stay valid even if the
/// type is re-registered afterwards; readers keep the table they resolved.
pub struct TypeInfo {
    name: &'static str,
    properties: HashMap<String, PropertyDescriptor, RandomState>,
    methods: HashMap<String, Vec<MethodDescriptor>, RandomState>,
    indexers: Vec<MethodDescriptor>,
}

impl TypeInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// All overloads registered under `name`, in registration order.
    pub fn methods(&self, name: &str) -> &[MethodDescriptor] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn indexers(&self) -> &[MethodDescriptor] {
        &self.indexers
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Builder collecting the members of one type inside [`TypeRegistry::register`].
pub struct TypeBuilder<T> {
    properties: HashMap<String, PropertyDescriptor, RandomState>,
    methods: HashMap<String, Vec<MethodDescriptor>, RandomState>,
    indexers: Vec<MethodDescriptor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Send + Sync + 'static> TypeBuilder<T> {
    fn new() -> Self {
        Self {
            properties: HashMap::default(),
            methods: HashMap::default(),
            indexers: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Registers a readable property with a declared static type.
    pub fn property<F>(&mut self, name: &str, ty: StaticType, get: F) -> &mut Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.properties
            .insert(name.to_string(), PropertyDescriptor::for_payload::<T, F>(name, ty, get));
        self
    }

    /// Registers a method overload. Repeated names accumulate overloads in
    /// registration order.
    pub fn method<F>(
        &mut self,
        name: &str,
        params: &[ParamType],
        returns: StaticType,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&T, &[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        self.push_method(MethodDescriptor::for_payload::<T, F>(name, params, returns, body));
        self
    }

    /// Registers a variadic method overload; the last parameter describes the
    /// element type of the packed tail.
    pub fn variadic_method<F>(
        &mut self,
        name: &str,
        params: &[ParamType],
        returns: StaticType,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&T, &[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        self.push_method(
            MethodDescriptor::for_payload::<T, F>(name, params, returns, body).variadic(),
        );
        self
    }

    /// Registers an indexer overload. The body receives the index arguments.
    pub fn indexer<F>(&mut self, params: &[ParamType], returns: StaticType, body: F) -> &mut Self
    where
        F: Fn(&T, &[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        self.indexers
            .push(MethodDescriptor::for_payload::<T, F>("[]", params, returns, body));
        self
    }

    fn push_method(&mut self, descriptor: MethodDescriptor) {
        self.methods
            .entry(descriptor.name().to_string())
            .or_default()
            .push(descriptor);
    }

    fn finish(self, name: &'static str) -> TypeInfo {
        TypeInfo {
            name,
            properties: self.properties,
            methods: self.methods,
            indexers: self.indexers,
        }
    }
}

struct Tables {
    types: HashMap<TypeId, Arc<TypeInfo>, RandomState>,
    functions: HashMap<String, Vec<MethodDescriptor>, RandomState>,
}

/// Thread-safe table of reflective type descriptions.
///
/// Registrations happen through a builder closure and become immutable on
/// insert; re-registering a type replaces its entry wholesale. The registry is
/// meant to be constructed explicitly and shared (typically through the
/// service container), never held as process-global state.
///
/// # Examples
///
/// ```rust
/// use bindery::{ParamType, StaticType, TypeRegistry, Value};
///
/// struct Greeter {
///     salutation: String,
/// }
///
/// let registry = TypeRegistry::new();
/// registry.register::<Greeter>(|t| {
///     t.property("salutation", StaticType::Str, |g| Value::str(g.salutation.clone()));
///     t.method("greet", &[ParamType::Str], StaticType::Str, |g, args| {
///         let who = args[0].as_str().unwrap_or("world");
///         Ok(Value::str(format!("{} {}", g.salutation, who)))
///     });
/// });
///
/// let info = registry.describe_type::<Greeter>().unwrap();
/// assert!(info.property("salutation").is_some());
/// assert_eq!(info.methods("greet").len(), 1);
/// ```
pub struct TypeRegistry {
    tables: Mutex<Tables>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                types: HashMap::default(),
                functions: HashMap::default(),
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers (or replaces) the member table for `T`.
    pub fn register<T>(&self, build: impl FnOnce(&mut TypeBuilder<T>))
    where
        T: Send + Sync + 'static,
    {
        let mut builder = TypeBuilder::<T>::new();
        build(&mut builder);
        let info = Arc::new(builder.finish(type_name::<T>()));
        self.tables().types.insert(TypeId::of::<T>(), info);
    }

    /// Registers a free function overload callable without a target.
    pub fn function<F>(&self, name: &str, params: &[ParamType], returns: StaticType, body: F)
    where
        F: Fn(&[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        self.push_function(MethodDescriptor::new(
            name,
            params,
            returns,
            move |_target, args| body(args),
        ));
    }

    /// Registers a variadic free function overload.
    pub fn variadic_function<F>(
        &self,
        name: &str,
        params: &[ParamType],
        returns: StaticType,
        body: F,
    ) where
        F: Fn(&[Value]) -> BindResult<Value> + Send + Sync + 'static,
    {
        self.push_function(
            MethodDescriptor::new(name, params, returns, move |_target, args| body(args))
                .variadic(),
        );
    }

    fn push_function(&self, descriptor: MethodDescriptor) {
        self.tables()
            .functions
            .entry(descriptor.name().to_string())
            .or_default()
            .push(descriptor);
    }

    /// Member table snapshot for a type id, if registered.
    pub fn describe(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
        self.tables().types.get(&id).cloned()
    }

    /// Member table snapshot for `T`, if registered.
    pub fn describe_type<T: Any>(&self) -> Option<Arc<TypeInfo>> {
        self.describe(TypeId::of::<T>())
    }

    /// Free function overloads under `name`, in registration order.
    pub fn functions(&self, name: &str) -> Vec<MethodDescriptor> {
        self.tables().functions.get(name).cloned().unwrap_or_default()
    }

    /// Registered display name for a type id.
    pub fn type_name(&self, id: TypeId) -> Option<&'static str> {
        self.tables().types.get(&id).map(|info| info.name())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.tables().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables().types.is_empty()
    }

    /// Drops every registration, returning the registry to its initial state.
    pub fn clear(&self) {
        let mut tables = self.tables();
        tables.types.clear();
        tables.functions.clear();
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Endpoint {
        host: String,
        port: u16,
    }

    fn endpoint_registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry.register::<Endpoint>(|t| {
            t.property("host", StaticType::Str, |e| Value::str(e.host.clone()));
            t.property("port", StaticType::Int, |e| Value::Int(e.port as i64));
            t.method("with_port", &[ParamType::Int], StaticType::Str, |e, args| {
                let port = args[0].as_i64().unwrap_or(e.port as i64);
                Ok(Value::str(format!("{}:{}", e.host, port)))
            });
            t.method("with_port", &[ParamType::Str], StaticType::Str, |e, args| {
                Ok(Value::str(format!("{}:{}", e.host, args[0].as_str().unwrap_or(""))))
            });
            t.indexer(&[ParamType::Int], StaticType::Str, |e, args| {
                let i = args[0].as_i64().unwrap_or(0);
                Ok(Value::str(format!("{}#{}", e.host, i)))
            });
        });
        registry
    }

    #[test]
    fn test_register_and_describe() {
        let registry = endpoint_registry();
        let info = registry.describe_type::<Endpoint>().unwrap();
        assert_eq!(info.name(), type_name::<Endpoint>());
        assert_eq!(info.property_count(), 2);
        assert_eq!(info.methods("with_port").len(), 2);
        assert_eq!(info.methods("missing").len(), 0);
        assert_eq!(info.indexers().len(), 1);
        assert!(registry.describe(TypeId::of::<String>()).is_none());
    }

    #[test]
    fn test_property_reads_through_value() {
        let registry = endpoint_registry();
        let info = registry.describe_type::<Endpoint>().unwrap();
        let target = Value::obj(Endpoint {
            host: "db".to_string(),
            port: 5432,
        });
        let host = info.property("host").unwrap().read(&target).unwrap();
        assert_eq!(host.as_str(), Some("db"));
        let port = info.property("port").unwrap().read(&target).unwrap();
        assert_eq!(port.as_i64(), Some(5432));
    }

    #[test]
    fn test_wrong_receiver_is_invalid_cast() {
        let registry = endpoint_registry();
        let info = registry.describe_type::<Endpoint>().unwrap();
        let err = info
            .property("host")
            .unwrap()
            .read(&Value::Int(3))
            .unwrap_err();
        assert!(matches!(err, BindError::InvalidCast(_)));
    }

    #[test]
    fn test_overloads_keep_registration_order() {
        let registry = endpoint_registry();
        let info = registry.describe_type::<Endpoint>().unwrap();
        let overloads = info.methods("with_port");
        assert_eq!(overloads[0].params(), &[ParamType::Int]);
        assert_eq!(overloads[1].params(), &[ParamType::Str]);
    }

    #[test]
    fn test_reregister_replaces_entry_but_old_snapshots_survive() {
        let registry = endpoint_registry();
        let before = registry.describe_type::<Endpoint>().unwrap();
        registry.register::<Endpoint>(|t| {
            t.property("host", StaticType::Str, |e| Value::str(e.host.clone()));
        });
        let after = registry.describe_type::<Endpoint>().unwrap();
        assert_eq!(before.property_count(), 2);
        assert_eq!(after.property_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_free_functions_accumulate_overloads() {
        let registry = TypeRegistry::new();
        registry.function("max", &[ParamType::Int, ParamType::Int], StaticType::Int, |args| {
            Ok(Value::Int(args[0].as_i64().unwrap_or(0).max(args[1].as_i64().unwrap_or(0))))
        });
        registry.variadic_function("max", &[ParamType::Int], StaticType::Int, |args| {
            let items = args[0].as_list().unwrap_or(&[]);
            Ok(Value::Int(items.iter().filter_map(Value::as_i64).max().unwrap_or(0)))
        });
        let overloads = registry.functions("max");
        assert_eq!(overloads.len(), 2);
        assert!(!overloads[0].is_variadic());
        assert!(overloads[1].is_variadic());
        let out = overloads[0].invoke(&Value::Null, &[Value::Int(3), Value::Int(9)]).unwrap();
        assert_eq!(out.as_i64(), Some(9));
    }

    #[test]
    fn test_clear_resets_everything() {
        let registry = endpoint_registry();
        registry.function("noop", &[], StaticType::Null, |_| Ok(Value::Null));
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.functions("noop").is_empty());
        assert!(registry.describe_type::<Endpoint>().is_none());
    }

    #[test]
    fn test_static_type_ids_line_up_with_runtime_types() {
        assert_eq!(
            Value::Int(1).static_type().type_id(),
            Some(Value::Int(1).runtime_type())
        );
        assert_eq!(
            Value::str("x").static_type().type_id(),
            Some(Value::str("x").runtime_type())
        );
        assert_eq!(
            Value::Null.static_type().type_id(),
            Some(Value::Null.runtime_type())
        );
        assert_eq!(StaticType::Unknown.type_id(), None);
    }
}
