//! Module resolution core
//!
//! This module provides the process-wide module cache and the resolution
//! pipeline that backs it, enabling host applications to locate native
//! modules from embedded resources or the file system on demand.
//!
//! ## Architecture
//!
//! - **Cache**: name-keyed, case-insensitive registry; the first handle
//!   registered for a name wins and later loads converge on it
//! - **Loader**: turns file paths and in-memory byte streams into cached
//!   handles, deduplicating loads by origin
//! - **Engine**: orders the embedded and file-system sources, absorbs
//!   their failures, and serves lookups from the cache first
//! - **Hooks**: subscribes the engine to a host's resolution-failure
//!   event, once per context, with a guard that unhooks on drop

pub mod cache;
pub mod engine;
pub mod handle;
pub mod hooks;
pub mod loader;

pub use cache::ModuleCache;
pub use engine::ModuleResolver;
pub use handle::{ModuleArtifact, ModuleHandle, ModuleOrigin};
pub use hooks::{bare_module_name, HookRegistrar, RegistrationGuard};
pub use loader::{LoadError, ModuleLoader, NativeLoader};
