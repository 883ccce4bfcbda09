//! Module loading
//!
//! `ModuleLoader` turns a file path or an in-memory byte stream into a cached
//! `ModuleHandle`. The platform-specific materialization step sits behind the
//! `NativeLoader` trait so hosts and tests can substitute their own.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::resolver::cache::ModuleCache;
use crate::resolver::handle::{ModuleArtifact, ModuleHandle, ModuleOrigin};

/// Errors from materializing a module.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Module file not found: {0}")]
    Missing(PathBuf),

    #[error("Not a loadable module path: {0}")]
    InvalidPath(PathBuf),

    #[error("Platform loader rejected {origin}: {reason}")]
    Rejected { origin: String, reason: String },

    #[error("Embedded resource {name} could not be read: {reason}")]
    Resource { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform load primitive.
///
/// One implementation per way of getting bytes into the process as a live
/// module: the `dylib` feature ships a dlopen-backed one, tests use stubs.
pub trait NativeLoader: Send + Sync {
    /// Materialize the module file at `path`.
    fn load_file(&self, path: &Path) -> Result<Arc<dyn ModuleArtifact>, LoadError>;

    /// Materialize a module from raw bytes. `name` is the module's short
    /// name, available for diagnostics and temp-file naming.
    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Arc<dyn ModuleArtifact>, LoadError>;
}

/// Loads modules and registers them in the shared cache.
pub struct ModuleLoader {
    cache: Arc<ModuleCache>,
    native: Arc<dyn NativeLoader>,
}

impl ModuleLoader {
    /// Create a loader that registers into `cache` via `native`.
    pub fn new(cache: Arc<ModuleCache>, native: Arc<dyn NativeLoader>) -> Self {
        Self { cache, native }
    }

    /// Load a module from a file on disk.
    ///
    /// If a module from this exact path is already cached, that handle is
    /// returned and the platform loader is not consulted, so one on-disk
    /// origin never yields two live instances. The module's cache name is
    /// the file stem.
    pub fn load_from_path(&self, path: &Path) -> Result<ModuleHandle, LoadError> {
        if let Some(existing) = self.cache.find_by_path(path) {
            debug!("Module at {} already loaded", path.display());
            return Ok(existing);
        }

        if !path.exists() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| LoadError::InvalidPath(path.to_path_buf()))?
            .to_string();

        let artifact = self.native.load_file(path)?;
        let handle = ModuleHandle::new(name, ModuleOrigin::File(path.to_path_buf()), artifact);
        self.register_converged(handle)
    }

    /// Load a module from an in-memory byte stream.
    ///
    /// `None` bytes mean "nothing to load" and map to `Ok(None)` rather than
    /// an error, mirroring how an absent embedded resource is an ordinary
    /// outcome of resolution.
    pub fn load_from_bytes(
        &self,
        name: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<ModuleHandle>, LoadError> {
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let artifact = self.native.load_bytes(name, bytes)?;
        let handle = ModuleHandle::new(name, ModuleOrigin::Embedded, artifact);
        self.register_converged(handle).map(Some)
    }

    /// Register `handle` and hand back the cache's winner for its name, so
    /// concurrent loads of one module converge on a single handle.
    fn register_converged(&self, handle: ModuleHandle) -> Result<ModuleHandle, LoadError> {
        self.cache.register(handle.clone());
        Ok(self.cache.lookup(handle.name()).unwrap_or(handle))
    }

    /// The cache this loader registers into.
    pub fn cache(&self) -> &Arc<ModuleCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubArtifact;
    impl ModuleArtifact for StubArtifact {}

    /// Counts materializations so tests can assert dedup behavior.
    struct CountingLoader {
        file_loads: AtomicUsize,
        byte_loads: AtomicUsize,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self {
                file_loads: AtomicUsize::new(0),
                byte_loads: AtomicUsize::new(0),
            }
        }
    }

    impl NativeLoader for CountingLoader {
        fn load_file(&self, _path: &Path) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
            self.file_loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubArtifact))
        }

        fn load_bytes(
            &self,
            _name: &str,
            _bytes: &[u8],
        ) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
            self.byte_loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubArtifact))
        }
    }

    fn loader_with_counts() -> (ModuleLoader, Arc<CountingLoader>) {
        let native = Arc::new(CountingLoader::new());
        let loader = ModuleLoader::new(Arc::new(ModuleCache::new()), native.clone());
        (loader, native)
    }

    #[test]
    fn test_load_from_path_registers_stem_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Alpha.so");
        std::fs::write(&path, b"module bytes").unwrap();

        let (loader, _native) = loader_with_counts();
        let handle = loader.load_from_path(&path).unwrap();

        assert_eq!(handle.name(), "Alpha");
        assert_eq!(handle.origin(), &ModuleOrigin::File(path));
        assert!(loader.cache().lookup("alpha").is_some());
    }

    #[test]
    fn test_load_from_path_dedups_by_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Alpha.so");
        std::fs::write(&path, b"module bytes").unwrap();

        let (loader, native) = loader_with_counts();
        let first = loader.load_from_path(&path).unwrap();
        let second = loader.load_from_path(&path).unwrap();

        assert!(first.same_instance(&second));
        assert_eq!(native.file_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_from_missing_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Ghost.so");

        let (loader, native) = loader_with_counts();
        let err = loader.load_from_path(&path).unwrap_err();

        assert!(matches!(err, LoadError::Missing(p) if p == path));
        assert_eq!(native.file_loads.load(Ordering::SeqCst), 0);
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_load_from_bytes_absent_is_none() {
        let (loader, native) = loader_with_counts();
        let result = loader.load_from_bytes("Alpha", None).unwrap();

        assert!(result.is_none());
        assert_eq!(native.byte_loads.load(Ordering::SeqCst), 0);
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_load_from_bytes_registers_embedded() {
        let (loader, _native) = loader_with_counts();
        let handle = loader.load_from_bytes("Alpha", Some(b"bytes")).unwrap().unwrap();

        assert_eq!(handle.name(), "Alpha");
        assert_eq!(handle.origin(), &ModuleOrigin::Embedded);
        assert!(loader.cache().lookup("ALPHA").is_some());
    }

    #[test]
    fn test_loads_converge_on_first_cached_handle() {
        let (loader, _native) = loader_with_counts();
        let first = loader.load_from_bytes("Alpha", Some(b"one")).unwrap().unwrap();
        // Same name from a different byte stream: cache keeps the first.
        let second = loader.load_from_bytes("alpha", Some(b"two")).unwrap().unwrap();

        assert!(first.same_instance(&second));
        assert_eq!(loader.cache().len(), 1);
    }
}
