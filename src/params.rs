//! Named activation parameters supplied with a resolution request.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Named values handed to the activated binding alongside a resolution.
///
/// Parameters override or supplement what a factory or [`Injectable`]
/// constructor would otherwise pull from the container. They apply only to
/// the activation of the requested binding; dependencies resolved from
/// inside it see an empty parameter set.
///
/// [`Injectable`]: crate::Injectable
///
/// # Examples
///
/// ```
/// use bindery::{ActivationParams, Resolver, ServiceContainer};
///
/// struct Greeting(String);
///
/// let container = ServiceContainer::new();
/// container.bind_transient(|ctx| {
///     let who = ctx.param::<String>("who")
///         .map(|s| (*s).clone())
///         .unwrap_or_else(|| "world".to_string());
///     Greeting(format!("hello {}", who))
/// });
///
/// let params = ActivationParams::new().with("who", "rust".to_string());
/// let greeting = container.get_with::<Greeting>(params).unwrap();
/// assert_eq!(greeting.0, "hello rust");
///
/// let plain = container.get::<Greeting>().unwrap();
/// assert_eq!(plain.0, "hello world");
/// ```
#[derive(Clone, Default)]
pub struct ActivationParams {
    entries: Vec<(&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl ActivationParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named value, builder style.
    pub fn with<P: Any + Send + Sync>(mut self, name: &'static str, value: P) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a named value.
    ///
    /// A repeated name shadows the earlier entry; lookups see the latest.
    pub fn insert<P: Any + Send + Sync>(&mut self, name: &'static str, value: P) {
        self.entries.push((name, Arc::new(value)));
    }

    /// Looks up a named value, downcast to `P`.
    ///
    /// Returns `None` when the name is absent or holds a different type.
    pub fn get<P: Any + Send + Sync>(&self, name: &str) -> Option<Arc<P>> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.clone().downcast::<P>().ok())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }
}

impl fmt::Debug for ActivationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_entry_shadows_earlier_one() {
        let params = ActivationParams::new()
            .with("port", 1u32)
            .with("port", 2u32);
        assert_eq!(*params.get::<u32>("port").unwrap(), 2);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn wrong_type_lookup_is_none() {
        let params = ActivationParams::new().with("port", 8080u32);
        assert!(params.get::<String>("port").is_none());
        assert!(params.get::<u32>("missing").is_none());
    }
}
