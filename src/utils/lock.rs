//! Lock utilities
//!
//! Helpers for common sync lock patterns with automatic release. A poisoned
//! lock is recovered rather than propagated: resolution must keep working
//! even after a panic elsewhere in the process poisoned shared state.

use std::sync::{Mutex, RwLock};

/// Execute a closure with a Mutex lock, automatically releasing it
///
/// # Example
/// ```ignore
/// let count = with_lock(&state, |map| map.len());
/// ```
pub fn with_lock<T, F, R>(mutex: &Mutex<T>, f: F) -> R
where
    F: FnOnce(&mut T) -> R,
{
    let mut guard = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Execute a closure with a read lock, automatically releasing it
pub fn with_read_lock<T, F, R>(rwlock: &RwLock<T>, f: F) -> R
where
    F: FnOnce(&T) -> R,
{
    let guard = rwlock.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&guard)
}

/// Execute a closure with a write lock, automatically releasing it
pub fn with_write_lock<T, F, R>(rwlock: &RwLock<T>, f: F) -> R
where
    F: FnOnce(&mut T) -> R,
{
    let mut guard = rwlock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}
