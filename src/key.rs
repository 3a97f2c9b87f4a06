//! Service key types for the binding store.

use std::any::TypeId;

/// Key for binding storage and lookup.
///
/// A key identifies the service a binding list belongs to. Names and
/// conditions do not participate in the key; they live on the individual
/// bindings and are filtered at match time, so one key always maps to the
/// full ordered list registered for that service.
///
/// # Key Types
///
/// - **Type**: Concrete types (structs, enums, primitives)
/// - **Trait**: Trait object bindings
///
/// # Examples
///
/// ```rust
/// use bindery::{Resolver, ServiceContainer, ServiceKey};
/// use std::sync::Arc;
///
/// let container = ServiceContainer::new();
/// container.bind_instance(42u32);
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) {
///         println!("LOG: {}", msg);
///     }
/// }
///
/// container.bind_trait_instance::<dyn Logger>(Arc::new(ConsoleLogger));
///
/// // Resolution uses keys internally
/// let number = container.get::<u32>().unwrap();       // Type key
/// let logger = container.get_trait::<dyn Logger>().unwrap(); // Trait key
///
/// assert_eq!(*number, 42);
/// logger.log("resolved");
/// ```
#[derive(Debug, Clone)]
pub enum ServiceKey {
    /// Concrete type key with TypeId and name for diagnostics
    ///
    /// Used for binding and resolving concrete types like `String`,
    /// `Database`, custom structs, etc. The TypeId provides fast lookup
    /// while the name helps with debugging.
    Type(TypeId, &'static str),
    /// Trait object key
    ///
    /// Used for binding and resolving trait objects like `dyn Logger`.
    /// Only stores the trait name since traits don't have TypeId.
    Trait(&'static str),
}

impl ServiceKey {
    /// Get the type or trait name for display
    ///
    /// Returns the human-readable type or trait name for debugging and
    /// error messages. This is the `std::any::type_name` result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindery::ServiceKey;
    /// use std::any::TypeId;
    ///
    /// let type_key = ServiceKey::Type(TypeId::of::<String>(), "alloc::string::String");
    /// assert_eq!(type_key.display_name(), "alloc::string::String");
    ///
    /// let trait_key = ServiceKey::Trait("dyn core::fmt::Debug");
    /// assert_eq!(trait_key.display_name(), "dyn core::fmt::Debug");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKey::Type(_, name) => name,
            ServiceKey::Trait(name) => name,
        }
    }
}

// TypeId-only comparison on the hot path; the string is diagnostics-only.
impl PartialEq for ServiceKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ServiceKey::Type(a, _), ServiceKey::Type(b, _)) => a == b,
            (ServiceKey::Trait(a), ServiceKey::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ServiceKey {}

// TypeId-only hash for concrete types, matching the PartialEq contract.
impl std::hash::Hash for ServiceKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            ServiceKey::Type(id, _) => {
                0u8.hash(state); // Discriminant
                id.hash(state);
            }
            ServiceKey::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

// Helper function for creating type keys - add aggressive inlining
#[inline(always)]
pub fn key_of_type<T: 'static>() -> ServiceKey {
    ServiceKey::Type(std::any::TypeId::of::<T>(), std::any::type_name::<T>())
}

#[inline(always)]
pub(crate) fn key_of_trait<T: ?Sized + 'static>() -> ServiceKey {
    ServiceKey::Trait(std::any::type_name::<T>())
}

/// A single resolution request: the service key, the optional binding name
/// it was made under, and any activation parameters.
///
/// Binding conditions receive the request and decide whether their binding
/// applies. The name filters named bindings: a named request only matches
/// bindings carrying the same name, and an unnamed request never matches a
/// named binding. Parameters apply to the activation of the selected
/// binding only.
///
/// # Examples
///
/// ```rust
/// use bindery::ResolveRequest;
///
/// let plain = ResolveRequest::of_type::<u32>();
/// assert_eq!(plain.name(), None);
///
/// let named = ResolveRequest::of_type::<u32>().named("port");
/// assert_eq!(named.name(), Some("port"));
/// assert_eq!(named.display_name(), "u32");
/// ```
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    key: ServiceKey,
    name: Option<&'static str>,
    params: Option<std::sync::Arc<crate::params::ActivationParams>>,
}

impl ResolveRequest {
    /// Request for a concrete type.
    pub fn of_type<T: 'static>() -> Self {
        ResolveRequest { key: key_of_type::<T>(), name: None, params: None }
    }

    /// Request for a trait object.
    pub fn of_trait<T: ?Sized + 'static>() -> Self {
        ResolveRequest { key: key_of_trait::<T>(), name: None, params: None }
    }

    /// Request built from an existing key.
    pub fn for_key(key: ServiceKey) -> Self {
        ResolveRequest { key, name: None, params: None }
    }

    /// Attach a binding name to the request.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Attach activation parameters to the request.
    pub fn with_params(mut self, params: crate::params::ActivationParams) -> Self {
        self.params = Some(std::sync::Arc::new(params));
        self
    }

    /// The service key being resolved.
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// The binding name the request was made under, if any.
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Activation parameters supplied with the request, if any.
    pub fn params(&self) -> Option<&crate::params::ActivationParams> {
        self.params.as_deref()
    }

    /// Type or trait name for diagnostics.
    pub fn display_name(&self) -> &'static str {
        self.key.display_name()
    }
}
