//! Module resolution engine
//!
//! `ModuleResolver` ties the cache, loader, and lookup sources together:
//! cache fast path first, then embedded resources and the file system in
//! the configured order. Source failures are absorbed and logged, never
//! raised; "couldn't look" and "doesn't exist" both come back as `None`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::locator::{PathScanner, ResourceLocator};
use crate::resolver::cache::ModuleCache;
use crate::resolver::handle::ModuleHandle;
use crate::resolver::loader::{ModuleLoader, NativeLoader};
use crate::utils::error::absorb;
use crate::utils::files::{resource_name_regex, strip_extensions};
use crate::utils::lock::{with_read_lock, with_write_lock};

/// Process-wide module resolution service.
///
/// Construct one at startup and share it; every component that resolves,
/// loads, or registers modules should go through the same instance so they
/// observe the same cache.
pub struct ModuleResolver {
    cache: Arc<ModuleCache>,
    loader: ModuleLoader,
    locator: Arc<dyn ResourceLocator>,
    scanner: Arc<dyn PathScanner>,
    search_dirs: RwLock<Vec<PathBuf>>,
    module_extension: RwLock<String>,
    embedded_first: AtomicBool,
}

impl ModuleResolver {
    /// Create a resolver with the platform dylib backend and default
    /// configuration.
    #[cfg(feature = "dylib")]
    pub fn new() -> Self {
        Self::with_config(&ResolverConfig::default())
    }

    /// Create a resolver with the platform dylib backend.
    #[cfg(feature = "dylib")]
    pub fn with_config(config: &ResolverConfig) -> Self {
        Self::with_backend(
            Arc::new(crate::native::DylibLoader::new()),
            Arc::new(crate::locator::ArtifactResourceLocator::new()),
            Arc::new(crate::locator::DirectoryScanner::new()),
            config,
        )
    }

    /// Create a resolver over explicit backends.
    pub fn with_backend(
        native: Arc<dyn NativeLoader>,
        locator: Arc<dyn ResourceLocator>,
        scanner: Arc<dyn PathScanner>,
        config: &ResolverConfig,
    ) -> Self {
        let cache = Arc::new(ModuleCache::new());
        let loader = ModuleLoader::new(Arc::clone(&cache), native);

        // Directory set semantics: keep configured order, drop duplicates.
        let mut search_dirs: Vec<PathBuf> = Vec::new();
        for dir in &config.search_dirs {
            if !search_dirs.contains(dir) {
                search_dirs.push(dir.clone());
            }
        }

        Self {
            cache,
            loader,
            locator,
            scanner,
            search_dirs: RwLock::new(search_dirs),
            module_extension: RwLock::new(
                config.module_extension.trim_start_matches('.').to_string(),
            ),
            embedded_first: AtomicBool::new(config.embedded_first),
        }
    }

    /// Resolve a module by name.
    ///
    /// Checks the cache, then the lookup sources in the configured order.
    /// The name is used as given: a name that already carries an extension
    /// is looked up literally, with the configured extension appended on
    /// top. Never raises; all source failures are logged and reported as
    /// `None`.
    pub fn resolve(&self, name: &str) -> Option<ModuleHandle> {
        if let Some(cached) = self.cache.lookup(name) {
            debug!("Resolved {} from cache", name);
            return Some(cached);
        }

        let file_name = format!("{}.{}", name, self.module_extension());
        let handle = if self.embedded_first() {
            self.from_embedded(name, &file_name)
                .or_else(|| self.from_files(&file_name))
        } else {
            self.from_files(&file_name)
                .or_else(|| self.from_embedded(name, &file_name))
        };

        match &handle {
            Some(handle) => info!("Resolved module {} from {}", name, handle.origin()),
            None => debug!("Module {} not found", name),
        }
        handle
    }

    /// Try the embedded resources of already loaded modules.
    fn from_embedded(&self, name: &str, file_name: &str) -> Option<ModuleHandle> {
        absorb(
            || {
                let modules = self.cache.handles();
                let Some(resource) = self.locator.find_embedded(&modules, file_name) else {
                    return Ok(None);
                };
                let bytes = self.locator.extract(&resource)?;
                self.loader.load_from_bytes(name, Some(&bytes))
            },
            "embedded resource lookup",
        )
    }

    /// Try the search directories, loading the first existing candidate.
    fn from_files(&self, file_name: &str) -> Option<ModuleHandle> {
        absorb(
            || {
                let dirs = self.search_dirs();
                let candidate = self
                    .scanner
                    .scan(&dirs, file_name)
                    .into_iter()
                    .find(|path| path.exists());
                let Some(path) = candidate else {
                    return Ok(None);
                };
                self.loader.load_from_path(&path).map(Some)
            },
            "file system lookup",
        )
    }

    /// Load every module embedded in already loaded modules whose name
    /// matches `pattern` (with the configured extension). Per-resource
    /// failures are absorbed; the successfully loaded handles are returned.
    pub fn preload_embedded(&self, pattern: &str) -> Vec<ModuleHandle> {
        let extension = self.module_extension();
        let regex = match resource_name_regex(pattern, &[&extension]) {
            Ok(regex) => regex,
            Err(e) => {
                debug!("Unusable preload pattern {:?}: {}", pattern, e);
                return Vec::new();
            }
        };

        let modules = self.cache.handles();
        let mut loaded = Vec::new();
        for resource in self.locator.find_matching(&modules, &regex) {
            let name = embedded_module_name(resource.name(), &extension);
            if name.is_empty() {
                continue;
            }
            let handle = absorb(
                || {
                    if let Some(existing) = self.cache.lookup(&name) {
                        return Ok(Some(existing));
                    }
                    let bytes = self.locator.extract(&resource)?;
                    self.loader.load_from_bytes(&name, Some(&bytes))
                },
                "embedded preload",
            );
            if let Some(handle) = handle {
                loaded.push(handle);
            }
        }
        loaded
    }

    /// Register an already loaded module, bypassing resolution.
    ///
    /// First write wins, like any cache registration; returns whether the
    /// handle was newly registered.
    pub fn register(&self, handle: ModuleHandle) -> bool {
        self.cache.register(handle)
    }

    /// Look a module up in the cache without consulting any source.
    pub fn lookup(&self, name: &str) -> Option<ModuleHandle> {
        self.cache.lookup(name)
    }

    /// Snapshot of every cached module.
    pub fn cached_modules(&self) -> Vec<ModuleHandle> {
        self.cache.handles()
    }

    /// The loader, for callers that load from explicit paths or byte
    /// streams themselves.
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Current search directories, in priority order.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        with_read_lock(&self.search_dirs, |dirs| dirs.clone())
    }

    /// Append a search directory. Already present directories are kept
    /// where they are; order is otherwise insertion order.
    pub fn add_search_dir(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        with_write_lock(&self.search_dirs, |dirs| {
            if !dirs.contains(&dir) {
                debug!("Adding search directory {}", dir.display());
                dirs.push(dir);
            }
        });
    }

    /// Remove a search directory. Returns whether it was present.
    pub fn remove_search_dir(&self, dir: &Path) -> bool {
        with_write_lock(&self.search_dirs, |dirs| {
            let before = dirs.len();
            dirs.retain(|d| d != dir);
            before != dirs.len()
        })
    }

    /// Whether embedded resources are consulted before the file system.
    pub fn embedded_first(&self) -> bool {
        // Relaxed is enough: readers only need eventual visibility.
        self.embedded_first.load(Ordering::Relaxed)
    }

    /// Flip the source order. Takes effect for subsequent resolutions.
    pub fn set_embedded_first(&self, embedded_first: bool) {
        self.embedded_first.store(embedded_first, Ordering::Relaxed);
    }

    /// The module file extension (without dot) used to derive file names.
    pub fn module_extension(&self) -> String {
        with_read_lock(&self.module_extension, |ext| ext.clone())
    }

    /// Change the module file extension. A leading dot is tolerated and
    /// stripped.
    pub fn set_module_extension(&self, extension: impl Into<String>) {
        let extension = extension.into().trim_start_matches('.').to_string();
        with_write_lock(&self.module_extension, |ext| *ext = extension);
    }
}

#[cfg(feature = "dylib")]
impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Bare module name implied by an embedded resource name: the trailing
/// component once the extension and any namespace or path prefix are gone.
fn embedded_module_name(resource_name: &str, extension: &str) -> String {
    let stem = strip_extensions(resource_name, &[extension]);
    stem.rsplit(['/', '\\', '.'])
        .next()
        .unwrap_or("")
        .to_string()
}
