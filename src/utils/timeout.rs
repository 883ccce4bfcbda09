//! Timeout utilities
//!
//! Timeout wrappers for host calls that might hang. Resolution itself is
//! synchronous; hosts driving it from async code move the blocking work to
//! the blocking pool and bound it with these.

use std::time::Duration;
use thiserror::Error;

/// Default ceiling for one host-driven resolution attempt.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// An operation exceeded its deadline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Apply a custom timeout to a future.
pub async fn with_custom_timeout<F>(
    future: F,
    duration: Duration,
) -> Result<F::Output, TimeoutError>
where
    F: std::future::Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError(duration))
}

/// Apply the default resolve timeout to a future.
pub async fn with_resolve_timeout<F>(future: F) -> Result<F::Output, TimeoutError>
where
    F: std::future::Future,
{
    with_custom_timeout(future, DEFAULT_RESOLVE_TIMEOUT).await
}

/// Run a blocking operation off the async runtime with a deadline.
///
/// The operation moves to the blocking pool; on timeout the caller gets
/// `TimeoutError` while the operation itself runs to completion in the
/// background. A panic inside the operation resumes on the caller.
pub async fn run_with_timeout<T, F>(operation: F, duration: Duration) -> Result<T, TimeoutError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(operation);
    match tokio::time::timeout(duration, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_error)) => {
            if join_error.is_panic() {
                std::panic::resume_unwind(join_error.into_panic());
            }
            // Cancelled task (runtime shutdown): report as timed out.
            Err(TimeoutError(duration))
        }
        Err(_) => Err(TimeoutError(duration)),
    }
}
