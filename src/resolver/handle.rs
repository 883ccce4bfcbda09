//! Module handles
//!
//! A `ModuleHandle` is the unit the cache, loader, and resolver trade in:
//! the module's short name, where its bytes came from, and the runtime
//! artifact the platform loader produced.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a loaded module's bytes came from.
///
/// A file origin records the path the module was loaded from and is the
/// key for load deduplication. Modules materialized from an in-memory
/// byte stream have no stable path and all share the `Embedded` origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleOrigin {
    /// Loaded from a file on disk.
    File(PathBuf),
    /// Materialized from an in-memory byte stream (e.g. an embedded resource).
    Embedded,
}

impl ModuleOrigin {
    /// Path of a file-backed origin, `None` for embedded modules.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ModuleOrigin::File(path) => Some(path),
            ModuleOrigin::Embedded => None,
        }
    }
}

impl fmt::Display for ModuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleOrigin::File(path) => write!(f, "{}", path.display()),
            ModuleOrigin::Embedded => write!(f, "embedded"),
        }
    }
}

/// Runtime artifact behind a module handle.
///
/// Implementations wrap whatever the platform loader produced (a dynamic
/// library, a test stub) and expose the module's embedded resource table.
/// Both methods have empty defaults; a module without bundled resources
/// does not need to implement anything.
pub trait ModuleArtifact: Send + Sync + 'static {
    /// Names of the byte blobs bundled inside this module.
    fn resource_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Read one bundled blob by its exact name.
    fn resource_bytes(&self, name: &str) -> Option<Vec<u8>> {
        let _ = name;
        None
    }
}

/// Handle to a loaded module.
///
/// Cheap to clone and immutable once created. All clones of a handle share
/// one artifact; the artifact (and any library it wraps) stays alive as
/// long as any clone does.
#[derive(Clone)]
pub struct ModuleHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    origin: ModuleOrigin,
    artifact: Arc<dyn ModuleArtifact>,
}

impl ModuleHandle {
    /// Create a handle for a loaded artifact.
    pub fn new(
        name: impl Into<String>,
        origin: ModuleOrigin,
        artifact: Arc<dyn ModuleArtifact>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                origin,
                artifact,
            }),
        }
    }

    /// The module's short name, as registered in the cache.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Where this module's bytes came from.
    pub fn origin(&self) -> &ModuleOrigin {
        &self.inner.origin
    }

    /// The runtime artifact backing this handle.
    pub fn artifact(&self) -> &Arc<dyn ModuleArtifact> {
        &self.inner.artifact
    }

    /// Whether two handles refer to the same loaded instance.
    pub fn same_instance(&self, other: &ModuleHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handles compare equal when they name the same module (case-insensitive)
/// from the same origin. Use [`ModuleHandle::same_instance`] for strict
/// instance identity.
impl PartialEq for ModuleHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.name().to_lowercase() == other.name().to_lowercase()
                && self.origin() == other.origin())
    }
}

impl Eq for ModuleHandle {}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.inner.name)
            .field("origin", &self.inner.origin)
            .finish()
    }
}
