//! Error types shared by the service container and the expression compiler.

use std::fmt;

/// Binding and compilation errors
///
/// Represents the error conditions that can occur during service binding,
/// resolution, expression compilation, or invocation in bindery.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindError, Resolver, ServiceContainer};
///
/// // Example of BindingNotFound error
/// let container = ServiceContainer::new();
/// match container.get::<String>() {
///     Err(BindError::BindingNotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///         println!("No binding for: {}", type_name);
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use bindery::BindError;
///
/// // Examples of error values
/// let not_found = BindError::BindingNotFound("MyService");
/// let ambiguous = BindError::AmbiguousBinding("MyService", 2);
/// let circular = BindError::CircularDependency(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// let no_method = BindError::NoApplicableMethod("Trim".to_string());
///
/// // All errors implement Display
/// println!("Error: {}", not_found);
/// println!("Error: {}", circular);
/// ```
#[derive(Debug, Clone)]
pub enum BindError {
    /// No binding matched the request
    BindingNotFound(&'static str),
    /// More than one binding matched and none disambiguated (match count included)
    AmbiguousBinding(&'static str, usize),
    /// Circular dependency detected (includes path)
    CircularDependency(Vec<&'static str>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Factory or constructor returned an error
    ActivationFailed(String),
    /// A named activation parameter was required but not supplied
    MissingParameter(&'static str),
    /// Expression node kind has no compilation rule
    UnexpectedNode(&'static str),
    /// No method or indexer overload accepted the arguments
    NoApplicableMethod(String),
    /// Member not found on the target type
    UnknownMember(String),
    /// Operator applied to operands it cannot combine
    IncompatibleOperands(&'static str),
    /// Integer division or remainder with a zero divisor
    DivisionByZero,
    /// List index outside the collection bounds
    IndexOutOfBounds(i64, usize),
    /// Runtime-checked cast failed during delegate invocation
    InvalidCast(String),
    /// Free identifier with no bound lambda parameter
    UnknownIdentifier(String),
    /// Source slot index out of range for the supplied arguments
    MissingSourceValue(usize),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::BindingNotFound(name) => write!(f, "No binding for: {}", name),
            BindError::AmbiguousBinding(name, count) => {
                write!(f, "Ambiguous binding for {}: {} candidates matched", name, count)
            }
            BindError::CircularDependency(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            BindError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            BindError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            BindError::ActivationFailed(msg) => write!(f, "Activation failed: {}", msg),
            BindError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            BindError::UnexpectedNode(kind) => {
                write!(f, "Unexpected expression node: {}", kind)
            }
            BindError::NoApplicableMethod(name) => {
                write!(f, "No applicable overload for: {}", name)
            }
            BindError::UnknownMember(name) => write!(f, "Unknown member: {}", name),
            BindError::IncompatibleOperands(op) => {
                write!(f, "Incompatible operands for: {}", op)
            }
            BindError::DivisionByZero => write!(f, "Division by zero"),
            BindError::IndexOutOfBounds(index, len) => {
                write!(f, "Index {} out of bounds for length {}", index, len)
            }
            BindError::InvalidCast(what) => write!(f, "Invalid cast: {}", what),
            BindError::UnknownIdentifier(name) => write!(f, "Unknown identifier: {}", name),
            BindError::MissingSourceValue(index) => {
                write!(f, "No source value at index {}", index)
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Result type for bindery operations
///
/// A convenience type alias for `Result<T, BindError>` used throughout the
/// crate. This follows the common Rust pattern of having a crate-specific
/// Result type to reduce boilerplate in function signatures.
///
/// # Examples
///
/// ```rust
/// use bindery::{BindResult, BindError};
///
/// fn create_service() -> BindResult<String> {
///     Ok("service created".to_string())
/// }
///
/// fn failing_operation() -> BindResult<()> {
///     Err(BindError::BindingNotFound("some_service"))
/// }
///
/// // Usage
/// match create_service() {
///     Ok(service) => println!("Success: {}", service),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub type BindResult<T> = Result<T, BindError>;
