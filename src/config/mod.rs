//! Configuration for the module resolver
//!
//! Handles configuration loading, defaults, and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or parsing a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "module_resolver=debug").
    /// RUST_LOG takes precedence when set.
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON-formatted logs (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            json_format: false,
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Directories scanned for module files, in priority order
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,

    /// Consult embedded resources before the file system
    #[serde(default = "default_true")]
    pub embedded_first: bool,

    /// Module file extension, without the leading dot
    #[serde(default = "default_module_extension")]
    pub module_extension: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_true() -> bool {
    true
}

fn default_search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_module_extension() -> String {
    std::env::consts::DLL_EXTENSION.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
            embedded_first: true,
            module_extension: default_module_extension(),
            logging: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.module_extension.is_empty() {
            return Err(anyhow::anyhow!("module_extension must not be empty"));
        }
        if self.module_extension.starts_with('.') {
            return Err(anyhow::anyhow!(
                "module_extension must be given without the leading dot (got {:?})",
                self.module_extension
            ));
        }
        Ok(())
    }
}
