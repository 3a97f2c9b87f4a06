//! Internal disposal bag for managing cleanup hooks.

use std::future::Future;
use std::pin::Pin;

/// Future type for disposal operations.
pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

enum Hook {
    Sync(Box<dyn FnOnce() + Send>),
    Async(Box<dyn FnOnce() -> BoxFutureUnit + Send>),
}

/// Container for disposal hooks with LIFO execution order.
///
/// Sync and async hooks share one list, so teardown runs in strict reverse
/// registration order regardless of kind.
#[derive(Default)]
pub(crate) struct DisposeBag {
    hooks: Vec<Hook>,
}

impl DisposeBag {
    /// Add a synchronous disposal hook.
    pub(crate) fn push_sync(&mut self, f: Box<dyn FnOnce() + Send>) {
        self.hooks.push(Hook::Sync(f));
    }

    /// Add an asynchronous disposal hook.
    pub(crate) fn push_async<Fut, F>(&mut self, f: F)
    where
        Fut: Future<Output = ()> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
    {
        self.hooks.push(Hook::Async(Box::new(move || Box::pin(f()))));
    }

    /// Execute every hook in reverse registration order (LIFO).
    pub(crate) async fn run_all_reverse(&mut self) {
        while let Some(hook) = self.hooks.pop() {
            match hook {
                Hook::Sync(f) => f(),
                Hook::Async(f) => f().await,
            }
        }
    }

    /// Number of hooks not yet run.
    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if the bag is empty (no disposers registered).
    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
