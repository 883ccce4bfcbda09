//! Embedded resource lookup
//!
//! Modules can bundle other modules as named byte blobs. The
//! `ResourceLocator` seam finds and extracts those blobs from already
//! loaded modules; `ArtifactResourceLocator` is the default, backed by
//! each artifact's resource table.

use regex::Regex;
use tracing::debug;

use crate::resolver::handle::ModuleHandle;
use crate::resolver::loader::LoadError;
use crate::utils::files::resource_name_regex;

/// A named byte blob found inside a loaded module.
#[derive(Debug, Clone)]
pub struct EmbeddedResource {
    owner: ModuleHandle,
    name: String,
}

impl EmbeddedResource {
    /// Describe the resource named `name` inside `owner`.
    pub fn new(owner: ModuleHandle, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }

    /// The module carrying the resource.
    pub fn owner(&self) -> &ModuleHandle {
        &self.owner
    }

    /// The resource's recorded name, which may carry a namespace or path
    /// prefix (`pkg.core.so`, `assets/core.so`).
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Finds byte blobs embedded in loaded modules.
pub trait ResourceLocator: Send + Sync {
    /// Find a resource whose trailing name matches `resource_name`,
    /// searching `modules` in order. Comparison is case-insensitive and
    /// tolerates namespace or path prefixes on the recorded name.
    fn find_embedded(
        &self,
        modules: &[ModuleHandle],
        resource_name: &str,
    ) -> Option<EmbeddedResource>;

    /// All resources across `modules` whose recorded name matches
    /// `pattern`. Locators that cannot enumerate report none.
    fn find_matching(&self, modules: &[ModuleHandle], pattern: &Regex) -> Vec<EmbeddedResource> {
        let _ = (modules, pattern);
        Vec::new()
    }

    /// Extract the resource's bytes.
    fn extract(&self, resource: &EmbeddedResource) -> Result<Vec<u8>, LoadError>;
}

/// Default locator backed by each artifact's resource table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactResourceLocator;

impl ArtifactResourceLocator {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceLocator for ArtifactResourceLocator {
    fn find_embedded(
        &self,
        modules: &[ModuleHandle],
        resource_name: &str,
    ) -> Option<EmbeddedResource> {
        let pattern = match resource_name_regex(resource_name, &[]) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!("Unusable resource name {:?}: {}", resource_name, e);
                return None;
            }
        };

        for module in modules {
            for name in module.artifact().resource_names() {
                if pattern.is_match(&name) {
                    debug!("Found resource {} in module {}", name, module.name());
                    return Some(EmbeddedResource::new(module.clone(), name));
                }
            }
        }
        None
    }

    fn find_matching(&self, modules: &[ModuleHandle], pattern: &Regex) -> Vec<EmbeddedResource> {
        let mut found = Vec::new();
        for module in modules {
            for name in module.artifact().resource_names() {
                if pattern.is_match(&name) {
                    found.push(EmbeddedResource::new(module.clone(), name));
                }
            }
        }
        found
    }

    fn extract(&self, resource: &EmbeddedResource) -> Result<Vec<u8>, LoadError> {
        resource
            .owner()
            .artifact()
            .resource_bytes(resource.name())
            .ok_or_else(|| LoadError::Resource {
                name: resource.name().to_string(),
                reason: format!("module {} no longer exposes it", resource.owner().name()),
            })
    }
}
