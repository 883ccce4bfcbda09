//! Error absorption utilities
//!
//! Resolution treats every source failure as "module not found": errors and
//! panics from lookup sources are logged and converted to `None` instead of
//! propagating. These helpers are that boundary.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Run a fallible lookup, converting failure and panic to `None`.
///
/// `Ok(Some(v))` passes through, `Ok(None)` stays `None`, and both `Err`
/// and a panic inside the operation are logged at debug level and become
/// `None`. Use for operations whose failure means "this source has no
/// answer", not for operations whose failure the caller must see.
///
/// # Example
/// ```ignore
/// let handle = absorb(|| scan_directories(&dirs, name), "file system lookup");
/// ```
pub fn absorb<T, E, F>(operation: F, context: &str) -> Option<T>
where
    F: FnOnce() -> Result<Option<T>, E>,
    E: std::fmt::Display,
{
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            debug!("{}: {}", context, e);
            None
        }
        Err(panic) => {
            debug!("{}: panicked: {}", context, panic_message(&panic));
            None
        }
    }
}

/// Run an infallible-but-panicky lookup, converting a panic to `None`.
///
/// The last line of defense before a callback result crosses into a host:
/// whatever the operation does, the caller gets `Option`, never a panic.
pub fn absorb_panic<T, F>(operation: F, context: &str) -> Option<T>
where
    F: FnOnce() -> Option<T>,
{
    match catch_unwind(AssertUnwindSafe(operation)) {
        Ok(value) => value,
        Err(panic) => {
            debug!("{}: panicked: {}", context, panic_message(&panic));
            None
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
