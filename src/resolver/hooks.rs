//! Host resolution hooks
//!
//! `HookRegistrar` wires a `ModuleResolver` into a host runtime's
//! module-resolution-failure event: at most one subscription per context,
//! removable by name or by dropping the returned guard. The installed
//! callback never lets an error or panic escape into the host.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::host::{HostRuntime, ResolveCallback, SubscriptionId};
use crate::resolver::engine::ModuleResolver;
use crate::utils::error::absorb_panic;
use crate::utils::lock::with_lock;

/// Keeps the resolver subscribed to host contexts, once each.
pub struct HookRegistrar {
    host: Arc<dyn HostRuntime>,
    resolver: Arc<ModuleResolver>,
    registrations: Mutex<HashMap<String, SubscriptionId>>,
}

impl HookRegistrar {
    /// Create a registrar that subscribes `resolver` into `host`.
    pub fn new(host: Arc<dyn HostRuntime>, resolver: Arc<ModuleResolver>) -> Self {
        Self {
            host,
            resolver,
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe the resolver to `context_id`'s resolution-failure event.
    ///
    /// Idempotent per context: a second call while the context is hooked
    /// adds nothing. Every call returns a guard; dropping any guard for
    /// the context unregisters it.
    pub fn register(self: &Arc<Self>, context_id: &str) -> RegistrationGuard {
        with_lock(&self.registrations, |registrations| {
            if registrations.contains_key(context_id) {
                debug!("Context {} already hooked", context_id);
                return;
            }
            let callback = resolution_callback(Arc::clone(&self.resolver));
            let subscription = self.host.subscribe(context_id, callback);
            registrations.insert(context_id.to_string(), subscription);
            info!("Hooked module resolution for context {}", context_id);
        });

        RegistrationGuard {
            registrar: Arc::clone(self),
            context_id: context_id.to_string(),
        }
    }

    /// Remove the context's subscription. Unknown contexts are a no-op.
    pub fn unregister(&self, context_id: &str) {
        let removed = with_lock(&self.registrations, |registrations| {
            registrations.remove(context_id)
        });
        // Unsubscribe outside the lock; the host may re-enter.
        match removed {
            Some(subscription) => {
                self.host.unsubscribe(context_id, subscription);
                info!("Unhooked module resolution for context {}", context_id);
            }
            None => debug!("No hook registered for context {}", context_id),
        }
    }

    /// Whether the context currently has a subscription.
    pub fn is_registered(&self, context_id: &str) -> bool {
        with_lock(&self.registrations, |registrations| {
            registrations.contains_key(context_id)
        })
    }

    /// Names of all hooked contexts, sorted.
    pub fn registered_contexts(&self) -> Vec<String> {
        let mut contexts = with_lock(&self.registrations, |registrations| {
            registrations.keys().cloned().collect::<Vec<_>>()
        });
        contexts.sort();
        contexts
    }

    /// The resolver these hooks feed.
    pub fn resolver(&self) -> &Arc<ModuleResolver> {
        &self.resolver
    }
}

/// Undoes one context registration on drop.
///
/// Dropping (or [`release`](RegistrationGuard::release)-ing) the guard
/// unregisters its context; if the context was already unregistered by
/// name, the drop is a no-op.
#[must_use = "dropping the guard unregisters the context"]
pub struct RegistrationGuard {
    registrar: Arc<HookRegistrar>,
    context_id: String,
}

impl RegistrationGuard {
    /// The context this guard covers.
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Unregister now, consuming the guard.
    pub fn release(self) {}
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registrar.unregister(&self.context_id);
    }
}

impl fmt::Debug for RegistrationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationGuard")
            .field("context_id", &self.context_id)
            .finish()
    }
}

/// Build the callback installed into a host context.
///
/// The host hands over the full module identifier; only the text before
/// the first comma names the module. Resolution runs behind a panic
/// boundary, so the host sees a handle or `None` and nothing else.
fn resolution_callback(resolver: Arc<ModuleResolver>) -> ResolveCallback {
    Arc::new(move |identifier: &str| {
        absorb_panic(
            || resolver.resolve(bare_module_name(identifier)),
            "module resolution hook",
        )
    })
}

/// The module name part of a host identifier: the text before the first
/// comma, trimmed. `"core, Version=1.2"` names `core`.
pub fn bare_module_name(identifier: &str) -> &str {
    identifier.split(',').next().unwrap_or(identifier).trim()
}
