//! Binding types backing the service container.

use std::any::Any;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::error::{BindError, BindResult};
use crate::key::ResolveRequest;
use crate::lifetime::Lifetime;

// ActivationContext is defined in the container module
pub(crate) use crate::container::ActivationContext;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased factory closure producing a stored instance.
pub(crate) type CtorFn =
    Arc<dyn for<'a> Fn(&ActivationContext<'a>) -> BindResult<AnyArc> + Send + Sync>;

/// Predicate deciding whether a binding applies to a request.
pub(crate) type ConditionFn = Arc<dyn Fn(&ResolveRequest) -> bool + Send + Sync>;

/// Mutable runtime state of a factory binding.
///
/// Shared behind an `Arc` so store snapshots and the live store memoize
/// through the same cell: whichever path activates a singleton first wins,
/// and every later read sees it.
pub(crate) struct FactorySlot {
    /// Singleton cache, `Some` only for singleton bindings.
    pub(crate) cell: Option<OnceCell<AnyArc>>,
    /// Factory closure; taken after a singleton initializes so captured
    /// state is released.
    pub(crate) ctor: Mutex<Option<CtorFn>>,
}

impl FactorySlot {
    fn new(lifetime: Lifetime, ctor: CtorFn) -> Self {
        let cell = match lifetime {
            Lifetime::Singleton => Some(OnceCell::new()),
            Lifetime::Transient => None,
        };
        Self { cell, ctor: Mutex::new(Some(ctor)) }
    }

    /// Clones the factory out of the slot without holding the lock across
    /// user code.
    pub(crate) fn take_ctor_handle(&self) -> Option<CtorFn> {
        match self.ctor.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drops the factory closure once the singleton value exists.
    pub(crate) fn release_ctor(&self) {
        match self.ctor.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

/// What a binding produces when selected.
#[derive(Clone)]
pub(crate) enum BindingTarget {
    /// Constant value supplied at bind time.
    Instance(AnyArc),
    /// Factory-produced value, singleton or transient per the lifetime.
    Factory(Arc<FactorySlot>),
}

/// One entry in a service's ordered binding list.
///
/// Bind operations append; a key never maps to fewer bindings than were
/// registered until an unbind removes the whole list. Clones share the
/// factory slot, so cloning for a snapshot costs two `Arc` bumps.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) lifetime: Lifetime,
    pub(crate) target: BindingTarget,
    /// Name filter: a named binding only matches a request carrying the
    /// same name.
    pub(crate) name: Option<&'static str>,
    /// Predicate filter evaluated against the request.
    pub(crate) condition: Option<ConditionFn>,
    /// Optional metadata for diagnostics and introspection
    pub(crate) metadata: Option<Arc<dyn Any + Send + Sync>>,
}

impl Binding {
    /// Creates a constant binding; constants are singletons by construction.
    pub(crate) fn instance(value: AnyArc) -> Self {
        Self {
            lifetime: Lifetime::Singleton,
            target: BindingTarget::Instance(value),
            name: None,
            condition: None,
            metadata: None,
        }
    }

    /// Creates a factory binding with the given lifetime.
    pub(crate) fn factory(lifetime: Lifetime, ctor: CtorFn) -> Self {
        Self {
            lifetime,
            target: BindingTarget::Factory(Arc::new(FactorySlot::new(lifetime, ctor))),
            name: None,
            condition: None,
            metadata: None,
        }
    }

    /// Applies the name and predicate filters to a request.
    pub(crate) fn matches(&self, request: &ResolveRequest) -> bool {
        match (self.name, request.name()) {
            (Some(bound), Some(asked)) if bound == asked => {}
            (None, None) => {}
            _ => return false,
        }
        if let Some(condition) = &self.condition {
            if !condition(request) {
                return false;
            }
        }
        true
    }

    /// True once a singleton value has been memoized.
    pub(crate) fn is_realized(&self) -> bool {
        match &self.target {
            BindingTarget::Instance(_) => true,
            BindingTarget::Factory(slot) => {
                slot.cell.as_ref().map(|c| c.get().is_some()).unwrap_or(false)
            }
        }
    }

    /// Produces the instance for this binding.
    ///
    /// Singletons initialize through their `OnceCell`, so concurrent first
    /// resolutions serialize on the cell: one caller runs the factory, the
    /// rest block and share the winner's value. After a successful first
    /// build the factory closure is dropped.
    pub(crate) fn activate(&self, ctx: &ActivationContext<'_>) -> BindResult<AnyArc> {
        match &self.target {
            BindingTarget::Instance(value) => Ok(value.clone()),
            BindingTarget::Factory(slot) => match self.lifetime {
                Lifetime::Singleton => {
                    let cell = slot.cell.as_ref().ok_or_else(|| {
                        BindError::ActivationFailed(
                            "singleton binding missing its cache cell".to_string(),
                        )
                    })?;
                    if let Some(value) = cell.get() {
                        return Ok(value.clone());
                    }
                    let value = cell.get_or_try_init(|| {
                        let ctor = slot.take_ctor_handle().ok_or_else(|| {
                            BindError::ActivationFailed(
                                "singleton factory already consumed".to_string(),
                            )
                        })?;
                        ctor(ctx)
                    })?;
                    slot.release_ctor();
                    Ok(value.clone())
                }
                Lifetime::Transient => {
                    let ctor = slot.take_ctor_handle().ok_or_else(|| {
                        BindError::ActivationFailed(
                            "transient factory already consumed".to_string(),
                        )
                    })?;
                    ctor(ctx)
                }
            },
        }
    }
}
