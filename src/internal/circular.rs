//! Cyclic dependency detection infrastructure.

use std::cell::RefCell;
use std::panic;

use crate::error::{BindError, BindResult};

// Thread-local resolution state for cyclic dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

// A stack entry is the requested type name plus the binding name the
// request was made under. Both participate in cycle detection, so a
// binding of `T` may depend on a differently named binding of `T`
// (decorator chains) without tripping the guard.
type StackEntry = (&'static str, Option<&'static str>);

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<StackEntry>,
    frozen: bool,
    depth: usize,
}

/// Panic payload for cyclic dependency detection.
///
/// When a cyclic dependency is detected during resolution, this panic
/// payload carries the complete dependency path for debugging.
///
/// Example path: `["ServiceA", "ServiceB", "ServiceC", "ServiceA"]`
#[derive(Debug)]
pub struct CircularPanic {
    /// The complete cyclic dependency path showing the cycle.
    pub path: Box<[&'static str]>,
}

impl CircularPanic {
    fn new(path: Vec<&'static str>) -> Self {
        CircularPanic { path: path.into_boxed_slice() }
    }
}

/// Guard for managing the thread-local resolution stack
pub(crate) struct StackGuard {
    entry: StackEntry,
}

impl StackGuard {
    pub(crate) fn new(name: &'static str, tag: Option<&'static str>, max_depth: usize) -> Self {
        let entry = (name, tag);
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Cycle detection BEFORE pushing the new entry
            if tls.stack.iter().any(|&e| e == entry) {
                let mut path: Vec<&'static str> = tls.stack.iter().map(|&(n, _)| n).collect();
                path.push(name);
                tls.frozen = true; // freeze pops during unwind
                panic::panic_any(CircularPanic::new(path));
            }

            // Depth guard
            if tls.depth >= max_depth {
                panic::panic_any(BindError::DepthExceeded(tls.depth));
            }

            tls.stack.push(entry);
            tls.depth += 1;
        });

        Self { entry }
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if !tls.frozen {
                if let Some(last) = tls.stack.pop() {
                    debug_assert_eq!(last, self.entry);
                }
                tls.depth = tls.depth.saturating_sub(1);
            }
        });
    }
}

// Restores the stack to `len` entries and unfreezes it. Called by the frame
// whose catch_unwind converted a panic into an error, so the thread can keep
// resolving after a cycle is reported (a live container may unbind the
// offending binding and retry).
fn unfreeze_and_truncate(len: usize) {
    RESOLUTION_TLS.with(|tls| {
        let mut tls = tls.borrow_mut();
        tls.frozen = false;
        tls.stack.truncate(len);
        tls.depth = len;
    });
}

/// Execute a closure with cyclic dependency detection
pub(crate) fn with_circular_catch<T, F>(
    name: &'static str,
    tag: Option<&'static str>,
    max_depth: usize,
    f: F,
) -> BindResult<T>
where
    F: FnOnce() -> BindResult<T>,
{
    use std::panic::AssertUnwindSafe;

    let entry_len = RESOLUTION_TLS.with(|tls| tls.borrow().stack.len());
    let _guard = StackGuard::new(name, tag, max_depth);

    // Wrap in catch_unwind to handle CircularPanic
    match std::panic::catch_unwind(AssertUnwindSafe(|| f())) {
        Ok(result) => result,
        Err(payload) => {
            if let Some(circular_panic) = payload.downcast_ref::<CircularPanic>() {
                let path: Vec<&'static str> = circular_panic.path.iter().copied().collect();
                // Leave our own entry for _guard's drop to pop
                unfreeze_and_truncate(entry_len + 1);
                Err(BindError::CircularDependency(path))
            } else if let Some(err) = payload.downcast_ref::<BindError>() {
                unfreeze_and_truncate(entry_len + 1);
                Err(err.clone())
            } else {
                // Re-panic for other types of panics
                std::panic::resume_unwind(payload);
            }
        }
    }
}
