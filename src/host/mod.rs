//! Host runtime abstraction
//!
//! A host runtime owns one or more execution contexts, each with a
//! module-resolution-failure event. The resolver subscribes callbacks to
//! that event through the `HostRuntime` trait; `EventHost` is an
//! in-process reference implementation for embedders and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::resolver::handle::ModuleHandle;
use crate::utils::lock::with_lock;

/// Callback invoked with the failing module identifier. Returns the
/// resolved handle, or `None` when this callback has no answer.
pub type ResolveCallback = Arc<dyn Fn(&str) -> Option<ModuleHandle> + Send + Sync>;

/// Opaque identifier for one subscription within a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A runtime that can notify subscribers when a context fails to resolve
/// a module.
///
/// `context_id` names the execution context (the default process context,
/// an isolated plugin domain). Implementations must tolerate unsubscribing
/// an id that is no longer present.
pub trait HostRuntime: Send + Sync {
    /// Subscribe `callback` to `context_id`'s resolution-failure event.
    fn subscribe(&self, context_id: &str, callback: ResolveCallback) -> SubscriptionId;

    /// Remove a previous subscription from `context_id`.
    fn unsubscribe(&self, context_id: &str, subscription: SubscriptionId);
}

/// In-process host runtime.
///
/// Keeps per-context subscriber lists and delivers a missing-module
/// identifier to each subscriber in subscription order, taking the first
/// answer. Subscribers are snapshotted before delivery so a callback may
/// re-enter the host without deadlocking.
pub struct EventHost {
    next_id: AtomicU64,
    subscriptions: Mutex<HashMap<String, Vec<(SubscriptionId, ResolveCallback)>>>,
}

impl EventHost {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Raise `context_id`'s resolution-failure event for `identifier`.
    ///
    /// Returns the first subscriber's answer, or `None` when no subscriber
    /// resolves it.
    pub fn raise_missing(&self, context_id: &str, identifier: &str) -> Option<ModuleHandle> {
        let callbacks: Vec<ResolveCallback> = with_lock(&self.subscriptions, |subscriptions| {
            subscriptions
                .get(context_id)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        });

        for callback in callbacks {
            if let Some(handle) = callback(identifier) {
                return Some(handle);
            }
        }
        None
    }

    /// Number of live subscriptions for a context.
    pub fn subscription_count(&self, context_id: &str) -> usize {
        with_lock(&self.subscriptions, |subscriptions| {
            subscriptions.get(context_id).map(|subs| subs.len()).unwrap_or(0)
        })
    }
}

impl HostRuntime for EventHost {
    fn subscribe(&self, context_id: &str, callback: ResolveCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        with_lock(&self.subscriptions, |subscriptions| {
            subscriptions
                .entry(context_id.to_string())
                .or_default()
                .push((id, callback));
        });
        debug!("Context {} gained subscription {:?}", context_id, id);
        id
    }

    fn unsubscribe(&self, context_id: &str, subscription: SubscriptionId) {
        with_lock(&self.subscriptions, |subscriptions| {
            if let Some(subs) = subscriptions.get_mut(context_id) {
                subs.retain(|(id, _)| *id != subscription);
                if subs.is_empty() {
                    subscriptions.remove(context_id);
                }
            }
        });
        debug!("Context {} dropped subscription {:?}", context_id, subscription);
    }
}

impl Default for EventHost {
    fn default() -> Self {
        Self::new()
    }
}
