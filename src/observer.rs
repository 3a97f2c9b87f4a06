//! Diagnostic observers for resolution traceability.
//!
//! This module provides hooks for observing container resolution events,
//! enabling structured tracing, performance monitoring, and debugging of
//! binding graphs.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::BindError;
use crate::key::ResolveRequest;

/// Observer trait for container resolution events.
///
/// Observers can track which services are being resolved, timing
/// information, and failure conditions. They are notified for every
/// top-level resolution entering the container, including resolutions
/// delegated to a parent.
///
/// # Performance
///
/// Observer calls are made synchronously during resolution. Keep
/// implementations lightweight; for expensive work, queue events and
/// process them elsewhere. When no observers are registered the
/// container skips the notification path entirely.
///
/// # Examples
///
/// ```
/// use bindery::{ResolutionObserver, ResolveRequest, Resolver, ServiceContainer};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct TraceObserver;
///
/// impl ResolutionObserver for TraceObserver {
///     fn resolving(&self, request: &ResolveRequest) {
///         println!("resolving {}", request.display_name());
///     }
///
///     fn resolved(&self, request: &ResolveRequest, duration: Duration) {
///         println!("resolved {} in {:?}", request.display_name(), duration);
///     }
/// }
///
/// let container = ServiceContainer::new();
/// container.add_observer(Arc::new(TraceObserver));
/// container.bind_instance(7usize);
///
/// // This lookup is reported to TraceObserver.
/// assert_eq!(*container.get::<usize>().unwrap(), 7);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called when a resolution enters the container.
    ///
    /// This runs before any binding is selected or factory invoked. Use it
    /// to start timing measurements and emit trace events.
    fn resolving(&self, request: &ResolveRequest);

    /// Called when a resolution completes successfully.
    ///
    /// `duration` is the time elapsed from `resolving` to completion,
    /// including any nested dependency construction.
    fn resolved(&self, request: &ResolveRequest, duration: Duration);

    /// Called when a resolution fails.
    ///
    /// Covers missing bindings, ambiguity, circular dependencies, and
    /// factory errors. The error is still returned to the caller after
    /// this notification.
    fn resolve_failed(&self, request: &ResolveRequest, error: &BindError, duration: Duration) {
        let _ = (request, error, duration);
    }
}

/// Fan-out collection of registered observers.
///
/// Designed so the no-observer case costs a single atomic load.
/// Observers can be added after the container is built, so the list
/// lives behind a read-write lock with a mirrored count.
#[derive(Default)]
pub(crate) struct Observers {
    observers: RwLock<Vec<Arc<dyn ResolutionObserver>>>,
    count: AtomicUsize,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn add(&self, observer: Arc<dyn ResolutionObserver>) {
        let mut observers = match self.observers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        observers.push(observer);
        self.count.store(observers.len(), Ordering::Release);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        self.count.load(Ordering::Acquire) > 0
    }

    #[inline]
    pub(crate) fn resolving(&self, request: &ResolveRequest) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer.resolving(request);
            }
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, request: &ResolveRequest, duration: Duration) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer.resolved(request, duration);
            }
        }
    }

    #[inline]
    pub(crate) fn resolve_failed(
        &self,
        request: &ResolveRequest,
        error: &BindError,
        duration: Duration,
    ) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer.resolve_failed(request, error, duration);
            }
        }
    }
}

/// Built-in observer that logs events to stdout and stderr.
///
/// A simple implementation useful for development and debugging. For
/// production use, implement a custom observer that integrates with your
/// logging infrastructure.
///
/// # Examples
///
/// ```
/// use bindery::{LoggingObserver, ServiceContainer};
/// use std::sync::Arc;
///
/// let container = ServiceContainer::new();
/// container.add_observer(Arc::new(LoggingObserver::new()));
/// // All resolutions through `container` are now logged.
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[bindery]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, request: &ResolveRequest) {
        match request.name() {
            Some(name) => println!(
                "{} Resolving: {} (name {:?})",
                self.prefix,
                request.display_name(),
                name
            ),
            None => println!("{} Resolving: {}", self.prefix, request.display_name()),
        }
    }

    fn resolved(&self, request: &ResolveRequest, duration: Duration) {
        println!(
            "{} Resolved: {} in {:?}",
            self.prefix,
            request.display_name(),
            duration
        );
    }

    fn resolve_failed(&self, request: &ResolveRequest, error: &BindError, duration: Duration) {
        eprintln!(
            "{} FAILED {} after {:?}: {}",
            self.prefix,
            request.display_name(),
            duration,
            error
        );
    }
}

/// Observer that collects aggregate resolution metrics.
///
/// Counts resolutions and failures and accumulates total resolution
/// time for post-run analysis.
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    total_resolution_time: AtomicU64,
    failure_count: AtomicU64,
}

impl MetricsObserver {
    /// Creates a new metrics observer with all counters at zero.
    pub fn new() -> Self {
        Self {
            resolution_count: AtomicU64::new(0),
            total_resolution_time: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Total number of successful resolutions observed.
    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    /// Average successful resolution time, or `None` before any resolution.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        let total_ns = self.total_resolution_time.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total_ns / count))
    }

    /// Total time spent in successful resolutions.
    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_time.load(Ordering::Relaxed))
    }

    /// Total number of failed resolutions observed.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.total_resolution_time.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for MetricsObserver {
    fn resolving(&self, _request: &ResolveRequest) {}

    fn resolved(&self, _request: &ResolveRequest, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn resolve_failed(&self, _request: &ResolveRequest, _error: &BindError, _duration: Duration) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResolveRequest;
    use std::time::Duration;

    #[test]
    fn metrics_observer_accumulates_and_resets() {
        let observer = MetricsObserver::new();
        let request = ResolveRequest::of_type::<String>();

        assert_eq!(observer.resolution_count(), 0);
        assert_eq!(observer.failure_count(), 0);
        assert!(observer.average_resolution_time().is_none());

        observer.resolved(&request, Duration::from_millis(10));
        observer.resolved(&request, Duration::from_millis(20));

        assert_eq!(observer.resolution_count(), 2);
        assert!(observer.average_resolution_time().is_some());
        assert!(observer.total_resolution_time() >= Duration::from_millis(30));

        observer.resolve_failed(
            &request,
            &BindError::BindingNotFound("String"),
            Duration::ZERO,
        );
        assert_eq!(observer.failure_count(), 1);

        observer.reset();
        assert_eq!(observer.resolution_count(), 0);
        assert_eq!(observer.failure_count(), 0);
    }

    #[test]
    fn observer_count_tracks_additions() {
        let observers = Observers::new();
        assert!(!observers.has_observers());

        observers.add(Arc::new(MetricsObserver::new()));
        assert!(observers.has_observers());

        let request = ResolveRequest::of_type::<u32>();
        observers.resolving(&request);
        observers.resolved(&request, Duration::from_micros(5));
    }

    #[test]
    fn fan_out_reaches_every_observer() {
        let observers = Observers::new();
        let first = Arc::new(MetricsObserver::new());
        let second = Arc::new(MetricsObserver::new());
        observers.add(first.clone());
        observers.add(second.clone());

        let request = ResolveRequest::of_type::<String>();
        observers.resolved(&request, Duration::from_millis(1));

        assert_eq!(first.resolution_count(), 1);
        assert_eq!(second.resolution_count(), 1);
    }
}
