//! Module Resolver - Process-wide module cache and resolution hooks
//!
//! This crate provides a process-wide resolver for native code modules:
//! given a bare module name it returns a previously loaded handle or looks
//! the module up across embedded resources and a configurable set of search
//! directories, caching the result so every name is materialized at most
//! once. A hook registrar wires the resolver into a host runtime's
//! module-resolution-failure event, so the host gets a second chance at
//! modules it cannot find by its normal means.
//!
//! ## Architecture
//!
//! 1. `ModuleCache` (name-keyed registry, first write wins)
//! 2. `ModuleLoader` (path and byte-stream materialization, origin dedup)
//! 3. `ModuleResolver` (cache fast path, then embedded/file sources in
//!    configurable order)
//! 4. `HookRegistrar` (idempotent per-context subscription into the host)
//!
//! ## Design Principles
//!
//! 1. **No Ambient State**: the resolver is an explicit service object,
//!    constructed once and shared via `Arc` rather than hidden statics
//! 2. **Never Throws Into the Host**: every failure inside resolution is
//!    absorbed and logged; the host sees a handle or nothing
//! 3. **Pluggable Backends**: platform loading, resource lookup, and
//!    directory scanning sit behind traits; the `dylib` feature supplies
//!    the real implementations
//! 4. **Convergent Cache**: concurrent first-time resolutions may race,
//!    but the cache settles on a single handle per name
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "dylib")] {
//! use module_resolver::ModuleResolver;
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(ModuleResolver::new());
//! resolver.add_search_dir("/opt/app/modules");
//!
//! if let Some(module) = resolver.resolve("analytics") {
//!     println!("loaded {} from {}", module.name(), module.origin());
//! }
//! # }
//! ```

pub mod config;
pub mod host;
pub mod locator;
#[cfg(feature = "dylib")]
pub mod native;
pub mod resolver;
pub mod utils;

// Re-export config module
pub use config::*;

// Re-export the resolution core
pub use resolver::{
    bare_module_name, HookRegistrar, LoadError, ModuleArtifact, ModuleCache, ModuleHandle,
    ModuleLoader, ModuleOrigin, ModuleResolver, NativeLoader, RegistrationGuard,
};

// Re-export the host seam and the trait backends
pub use host::{EventHost, HostRuntime, ResolveCallback, SubscriptionId};
pub use locator::{
    ArtifactResourceLocator, DirectoryScanner, EmbeddedResource, PathScanner, ResourceLocator,
};

#[cfg(feature = "dylib")]
pub use native::{DylibLoader, DylibModule};
