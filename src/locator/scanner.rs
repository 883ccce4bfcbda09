//! File system scanning
//!
//! Finds module file candidates under the configured search directories.
//! The `PathScanner` trait is the seam; `DirectoryScanner` is the default
//! recursive implementation.

use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use tracing::debug;

use crate::utils::files::filename_to_regex;

/// Source of module file candidates.
///
/// Implementations yield candidate paths for `file_name` across
/// `directories`, best match first. Candidates need not exist; consumers
/// check for existence before loading.
pub trait PathScanner: Send + Sync {
    fn scan(&self, directories: &[PathBuf], file_name: &str) -> Vec<PathBuf>;
}

/// Recursive directory scanner.
///
/// Walks each directory in order, yielding matches in the directory itself
/// before matches in subdirectories. File names are compared
/// case-insensitively and `file_name` may carry `*`/`?` wildcards.
/// Unreadable directories are skipped; symbolic links are not followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryScanner;

impl DirectoryScanner {
    pub fn new() -> Self {
        Self
    }

    /// All existing files under `directories` whose name matches `pattern`,
    /// in deterministic (sorted, breadth-last) order per directory.
    pub fn scan_matching(&self, directories: &[PathBuf], pattern: &Regex) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in directories {
            Self::walk(dir, pattern, &mut found);
        }
        found
    }

    fn walk(dir: &Path, pattern: &Regex, found: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                return;
            }
        };

        let mut entries: Vec<_> = entries.flatten().collect();
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                subdirs.push(entry.path());
            } else if pattern.is_match(&entry.file_name().to_string_lossy()) {
                found.push(entry.path());
            }
        }

        for subdir in subdirs {
            Self::walk(&subdir, pattern, found);
        }
    }
}

impl PathScanner for DirectoryScanner {
    fn scan(&self, directories: &[PathBuf], file_name: &str) -> Vec<PathBuf> {
        let pattern = match filename_to_regex(file_name, &[]) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!("Unusable file name pattern {:?}: {}", file_name, e);
                return Vec::new();
            }
        };
        self.scan_matching(directories, &pattern)
    }
}
