//! Module lookup sources
//!
//! The two places an unresolved module can come from: byte blobs embedded
//! in already loaded modules, and module files under the configured search
//! directories. Each source sits behind a trait so hosts can substitute
//! their own discovery.

pub mod embedded;
pub mod scanner;

pub use embedded::{ArtifactResourceLocator, EmbeddedResource, ResourceLocator};
pub use scanner::{DirectoryScanner, PathScanner};
