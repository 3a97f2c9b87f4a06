//! Binding descriptors for introspection and diagnostics.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::binding::Binding;
use crate::container::ServiceContainer;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;

/// Snapshot of one registered binding, for inspection.
///
/// Descriptors describe configuration, not live state beyond the
/// `realized` flag; holding one does not keep any instance alive.
///
/// # Use Cases
///
/// - **Debugging**: inspect what is bound and under which names
/// - **Validation**: assert required bindings exist at startup
/// - **Documentation**: generate binding inventories
///
/// # Examples
///
/// ```rust
/// use bindery::{Lifetime, ServiceContainer};
///
/// let container = ServiceContainer::new();
/// container.bind_instance(42u32);
/// container.bind::<String>().named("motd").to_instance("hello".to_string());
///
/// let descriptors = container.binding_descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let motd = descriptors.iter().find(|d| d.is_named()).unwrap();
/// assert_eq!(motd.name, Some("motd"));
/// assert_eq!(motd.lifetime, Lifetime::Singleton);
/// assert!(motd.realized); // constants count as realized
/// ```
#[derive(Clone)]
pub struct BindingDescriptor {
    /// The service key the binding is registered under
    pub key: ServiceKey,
    /// Binding lifetime
    pub lifetime: Lifetime,
    /// Binding name, for named bindings
    pub name: Option<&'static str>,
    /// Whether a request predicate is attached
    pub conditional: bool,
    /// Whether the bound instance already exists (constants, or
    /// singletons after their first resolution)
    pub realized: bool,
    metadata: Option<Arc<dyn Any + Send + Sync>>,
}

impl BindingDescriptor {
    pub(crate) fn from_binding(key: &ServiceKey, binding: &Binding) -> Self {
        Self {
            key: key.clone(),
            lifetime: binding.lifetime,
            name: binding.name,
            conditional: binding.condition.is_some(),
            realized: binding.is_realized(),
            metadata: binding.metadata.clone(),
        }
    }

    /// The type or trait name the binding serves.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// True for bindings registered under a name.
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// True when metadata was attached at bind time.
    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Downcasts the attached metadata.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindery::ServiceContainer;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Owner(&'static str);
    ///
    /// let container = ServiceContainer::new();
    /// container.bind::<u32>().with_metadata(Owner("billing")).to_instance(7);
    ///
    /// let descriptors = container.binding_descriptors();
    /// let owner = descriptors[0].metadata::<Owner>().unwrap();
    /// assert_eq!(*owner, Owner("billing"));
    /// ```
    pub fn metadata<M: Any + Send + Sync>(&self) -> Option<Arc<M>> {
        self.metadata
            .as_ref()
            .and_then(|m| m.clone().downcast::<M>().ok())
    }
}

impl fmt::Debug for BindingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("name", &self.name)
            .field("conditional", &self.conditional)
            .field("realized", &self.realized)
            .field("has_metadata", &self.metadata.is_some())
            .finish()
    }
}

impl ServiceContainer {
    /// Describes every binding registered on this container.
    ///
    /// Parents are not included; walk [`parent`](Self::parent) for the
    /// chain. Descriptors are sorted by type name, with each type's
    /// bindings in registration order.
    pub fn binding_descriptors(&self) -> Vec<BindingDescriptor> {
        let mut descriptors = self.with_store(|store| {
            store
                .iter()
                .flat_map(|(key, list)| {
                    list.iter().map(|b| BindingDescriptor::from_binding(key, b))
                })
                .collect::<Vec<_>>()
        });
        descriptors.sort_by_key(|d| d.type_name());
        descriptors
    }

    /// Renders this container's bindings as a human-readable listing.
    #[cfg(feature = "diagnostics")]
    pub fn debug_dump(&self) -> String {
        use std::fmt::Write;

        let descriptors = self.binding_descriptors();
        let synthesizers = self.with_store(|store| store.synthesizer_count());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "ServiceContainer ({} bindings, {} synthesizers{})",
            descriptors.len(),
            synthesizers,
            if self.parent().is_some() { ", has parent" } else { "" }
        );

        let mut current: Option<&'static str> = None;
        for descriptor in &descriptors {
            if current != Some(descriptor.type_name()) {
                current = Some(descriptor.type_name());
                let _ = writeln!(out, "  {}", descriptor.type_name());
            }
            let state = match (descriptor.lifetime, descriptor.realized) {
                (Lifetime::Singleton, true) => "singleton (realized)",
                (Lifetime::Singleton, false) => "singleton (lazy)",
                (Lifetime::Transient, _) => "transient",
            };
            let _ = write!(out, "    {}", state);
            if let Some(name) = descriptor.name {
                let _ = write!(out, ", name={:?}", name);
            }
            if descriptor.conditional {
                let _ = write!(out, ", conditional");
            }
            if descriptor.has_metadata() {
                let _ = write!(out, ", metadata");
            }
            out.push('\n');
        }
        out
    }
}
