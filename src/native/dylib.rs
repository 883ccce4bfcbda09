//! libloading-backed module loading
//!
//! Loads module files with dlopen and exposes their embedded resources
//! through an optional exported C table. Byte-stream loads are persisted
//! to a temp file first; the file lives as long as the module does.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tempfile::TempPath;
use tracing::debug;

use crate::resolver::handle::ModuleArtifact;
use crate::resolver::loader::{LoadError, NativeLoader};

/// ABI version of the resource table. A module built against a different
/// version simply exposes no resources.
pub const RESOURCE_ABI_VERSION: u32 = 1;

/// Exported symbol a module provides to publish embedded resources.
pub const RESOURCE_TABLE_SYMBOL: &[u8] = b"module_resource_table";

/// One embedded resource, C-compatible for the dylib boundary.
///
/// Pointers must reference memory owned by the module and valid for the
/// module's lifetime; names are UTF-8 and not null-terminated.
#[repr(C)]
pub struct ResourceEntry {
    pub name_ptr: *const u8,
    pub name_len: u32,
    pub data_ptr: *const u8,
    pub data_len: u32,
}

impl ResourceEntry {
    /// The resource name. Invalid UTF-8 is replaced, not rejected.
    pub fn name(&self) -> String {
        let raw = unsafe { std::slice::from_raw_parts(self.name_ptr, self.name_len as usize) };
        String::from_utf8_lossy(raw).into_owned()
    }

    /// The resource bytes.
    pub fn bytes(&self) -> Vec<u8> {
        let raw = unsafe { std::slice::from_raw_parts(self.data_ptr, self.data_len as usize) };
        raw.to_vec()
    }
}

unsafe impl Send for ResourceEntry {}
unsafe impl Sync for ResourceEntry {}

/// Resource table exported by modules via [`RESOURCE_TABLE_SYMBOL`].
#[repr(C)]
pub struct ResourceTable {
    /// ABI version, must equal [`RESOURCE_ABI_VERSION`].
    pub version: u32,
    /// Number of entries.
    pub entry_count: u32,
    /// Pointer to the entries array.
    pub entries: *const ResourceEntry,
}

unsafe impl Send for ResourceTable {}
unsafe impl Sync for ResourceTable {}

type ResourceTableFn = unsafe extern "C" fn() -> ResourceTable;

/// A module loaded as a platform dynamic library.
///
/// Keeps the library (and, for byte-stream loads, the backing temp file)
/// alive for the artifact's lifetime.
pub struct DylibModule {
    library: Library,
    _backing: Option<TempPath>,
}

impl DylibModule {
    fn read_table(&self) -> Vec<(String, Vec<u8>)> {
        let table_fn: Symbol<ResourceTableFn> =
            match unsafe { self.library.get(RESOURCE_TABLE_SYMBOL) } {
                Ok(symbol) => symbol,
                // No table exported: a module without resources.
                Err(_) => return Vec::new(),
            };

        let table = unsafe { table_fn() };
        if table.version != RESOURCE_ABI_VERSION {
            debug!(
                "Ignoring resource table with ABI version {} (expected {})",
                table.version, RESOURCE_ABI_VERSION
            );
            return Vec::new();
        }
        if table.entry_count == 0 || table.entries.is_null() {
            return Vec::new();
        }

        let entries =
            unsafe { std::slice::from_raw_parts(table.entries, table.entry_count as usize) };
        entries
            .iter()
            .map(|entry| (entry.name(), entry.bytes()))
            .collect()
    }
}

impl ModuleArtifact for DylibModule {
    fn resource_names(&self) -> Vec<String> {
        self.read_table().into_iter().map(|(name, _)| name).collect()
    }

    fn resource_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.read_table()
            .into_iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, bytes)| bytes)
    }
}

/// Platform loader backed by `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl DylibLoader {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<Library, LoadError> {
        // RTLD_GLOBAL so module symbols are visible to modules loaded later
        #[cfg(unix)]
        let library = unsafe {
            let flags = libloading::os::unix::RTLD_NOW | libloading::os::unix::RTLD_GLOBAL;
            libloading::os::unix::Library::open(Some(path), flags)
                .map(Library::from)
                .map_err(|e| LoadError::Rejected {
                    origin: path.display().to_string(),
                    reason: e.to_string(),
                })?
        };
        #[cfg(not(unix))]
        let library = unsafe {
            Library::new(path).map_err(|e| LoadError::Rejected {
                origin: path.display().to_string(),
                reason: e.to_string(),
            })?
        };
        Ok(library)
    }
}

impl NativeLoader for DylibLoader {
    fn load_file(&self, path: &Path) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        let library = Self::open(path)?;
        Ok(Arc::new(DylibModule {
            library,
            _backing: None,
        }))
    }

    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Arc<dyn ModuleArtifact>, LoadError> {
        let mut file = tempfile::Builder::new()
            .prefix(&temp_prefix(name))
            .suffix(&format!(".{}", std::env::consts::DLL_EXTENSION))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        // Close the write handle before mapping the library; the TempPath
        // keeps the file alive until the module is dropped.
        let (handle, path) = file.into_parts();
        drop(handle);

        let library = Self::open(&path)?;
        Ok(Arc::new(DylibModule {
            library,
            _backing: Some(path),
        }))
    }
}

/// Temp file prefix derived from a module name; anything that could be
/// interpreted by the file system is replaced.
fn temp_prefix(name: &str) -> String {
    let mut prefix: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if prefix.is_empty() {
        prefix.push_str("module");
    }
    prefix.push('-');
    prefix
}
