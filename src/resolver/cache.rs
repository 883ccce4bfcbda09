//! Process-wide module cache
//!
//! Name-keyed cache of loaded modules. Names are compared case-insensitively
//! and the first registration for a name wins; later registrations for the
//! same name are kept out so every caller observes one handle per name for
//! the life of the process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::resolver::handle::{ModuleHandle, ModuleOrigin};
use crate::utils::lock::with_lock;

/// Shared cache of loaded modules, keyed by case-insensitive name.
pub struct ModuleCache {
    modules: Mutex<HashMap<String, ModuleHandle>>,
}

impl ModuleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            modules: Mutex::new(HashMap::new()),
        }
    }

    fn key(name: &str) -> String {
        // Full Unicode lowercasing; "Ärger" and "ärger" are one entry.
        name.to_lowercase()
    }

    /// Register a handle under its name.
    ///
    /// First write wins: if the name is already present the cache is left
    /// unchanged and `false` is returned. Re-registering never fails, it is
    /// a silent no-op.
    pub fn register(&self, handle: ModuleHandle) -> bool {
        let key = Self::key(handle.name());
        with_lock(&self.modules, |modules| {
            if modules.contains_key(&key) {
                debug!("Module {} already cached, keeping existing handle", handle.name());
                return false;
            }
            debug!("Caching module {} ({})", handle.name(), handle.origin());
            modules.insert(key, handle);
            true
        })
    }

    /// Look up a module by name, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<ModuleHandle> {
        with_lock(&self.modules, |modules| modules.get(&Self::key(name)).cloned())
    }

    /// Find the module loaded from `path`, if any.
    ///
    /// Paths are compared as registered, without normalization. Embedded
    /// modules have no path and never match.
    pub fn find_by_path(&self, path: &Path) -> Option<ModuleHandle> {
        with_lock(&self.modules, |modules| {
            modules
                .values()
                .find(|handle| matches!(handle.origin(), ModuleOrigin::File(p) if p == path))
                .cloned()
        })
    }

    /// Snapshot of all cached handles, in no particular order.
    pub fn handles(&self) -> Vec<ModuleHandle> {
        with_lock(&self.modules, |modules| modules.values().cloned().collect())
    }

    /// Number of cached modules.
    pub fn len(&self) -> usize {
        with_lock(&self.modules, |modules| modules.len())
    }

    /// Whether the cache holds no modules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}
