use module_resolver::{
    ArtifactResourceLocator, EmbeddedResource, LoadError, ModuleArtifact, ModuleHandle,
    ModuleOrigin, ModuleResolver, NativeLoader, PathScanner, ResolverConfig, ResourceLocator,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Artifact with a fixed embedded-resource table.
pub struct StubArtifact {
    resources: HashMap<String, Vec<u8>>,
}

impl StubArtifact {
    pub fn empty() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    pub fn with_resources(entries: &[(&str, &[u8])]) -> Self {
        Self {
            resources: entries
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                .collect(),
        }
    }
}

impl ModuleArtifact for StubArtifact {
    fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().cloned().collect();
        names.sort();
        names
    }

    fn resource_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.resources.get(name).cloned()
    }
}

pub fn stub_handle(name: &str) -> ModuleHandle {
    ModuleHandle::new(name, ModuleOrigin::Embedded, Arc::new(StubArtifact::empty()))
}

/// A cached module that bundles other modules as embedded resources.
pub fn carrier_handle(name: &str, entries: &[(&str, &[u8])]) -> ModuleHandle {
    ModuleHandle::new(
        name,
        ModuleOrigin::Embedded,
        Arc::new(StubArtifact::with_resources(entries)),
    )
}

/// Platform loader that always succeeds and counts invocations.
pub struct CountingNativeLoader {
    file_loads: AtomicUsize,
    byte_loads: AtomicUsize,
}

impl CountingNativeLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            file_loads: AtomicUsize::new(0),
            byte_loads: AtomicUsize::new(0),
        })
    }

    pub fn file_loads(&self) -> usize {
        self.file_loads.load(Ordering::SeqCst)
    }

    pub fn byte_loads(&self) -> usize {
        self.byte_loads.load(Ordering::SeqCst)
    }
}

impl NativeLoader for CountingNativeLoader {
    fn load_file(&self, _path: &Path) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        self.file_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubArtifact::empty()))
    }

    fn load_bytes(&self, _name: &str, _bytes: &[u8]) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        self.byte_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubArtifact::empty()))
    }
}

/// Platform loader that rejects everything it is given.
pub struct FailingNativeLoader;

impl NativeLoader for FailingNativeLoader {
    fn load_file(&self, path: &Path) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        Err(LoadError::Rejected {
            origin: path.display().to_string(),
            reason: "stub rejects everything".to_string(),
        })
    }

    fn load_bytes(&self, name: &str, _bytes: &[u8]) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        Err(LoadError::Rejected {
            origin: name.to_string(),
            reason: "stub rejects everything".to_string(),
        })
    }
}

/// Real directory scanner wrapped with an invocation counter.
pub struct CountingScanner {
    inner: module_resolver::DirectoryScanner,
    scans: AtomicUsize,
}

impl CountingScanner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: module_resolver::DirectoryScanner::new(),
            scans: AtomicUsize::new(0),
        })
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl PathScanner for CountingScanner {
    fn scan(&self, directories: &[PathBuf], file_name: &str) -> Vec<PathBuf> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(directories, file_name)
    }
}

/// Scanner that panics when consulted.
pub struct PanickingScanner;

impl PathScanner for PanickingScanner {
    fn scan(&self, _directories: &[PathBuf], _file_name: &str) -> Vec<PathBuf> {
        panic!("scanner stub exploded")
    }
}

/// Locator that panics when consulted.
pub struct PanickingLocator;

impl ResourceLocator for PanickingLocator {
    fn find_embedded(
        &self,
        _modules: &[ModuleHandle],
        _resource_name: &str,
    ) -> Option<EmbeddedResource> {
        panic!("locator stub exploded")
    }

    fn extract(&self, _resource: &EmbeddedResource) -> Result<Vec<u8>, LoadError> {
        panic!("locator stub exploded")
    }
}

/// Locator that claims to find every resource but fails to extract it.
pub struct FailingLocator;

impl ResourceLocator for FailingLocator {
    fn find_embedded(
        &self,
        modules: &[ModuleHandle],
        resource_name: &str,
    ) -> Option<EmbeddedResource> {
        modules
            .first()
            .map(|module| EmbeddedResource::new(module.clone(), resource_name))
    }

    fn extract(&self, resource: &EmbeddedResource) -> Result<Vec<u8>, LoadError> {
        Err(LoadError::Resource {
            name: resource.name().to_string(),
            reason: "stub cannot extract".to_string(),
        })
    }
}

/// Resolver wired to counting stubs and a fixed `ext` module extension.
pub struct TestResolver {
    pub resolver: Arc<ModuleResolver>,
    pub native: Arc<CountingNativeLoader>,
    pub scanner: Arc<CountingScanner>,
}

impl TestResolver {
    pub fn new(search_dirs: Vec<PathBuf>, embedded_first: bool) -> Self {
        let native = CountingNativeLoader::new();
        let scanner = CountingScanner::new();
        let config = ResolverConfig {
            search_dirs,
            embedded_first,
            module_extension: "ext".to_string(),
            logging: None,
        };
        let resolver = Arc::new(ModuleResolver::with_backend(
            native.clone(),
            Arc::new(ArtifactResourceLocator::new()),
            scanner.clone(),
            &config,
        ));
        Self {
            resolver,
            native,
            scanner,
        }
    }
}

/// Write a placeholder module file and return its path.
pub fn write_module_file(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, b"stub module bytes").unwrap();
    path
}
