//! Platform loading backends
//!
//! The default backend dlopens module files with `libloading` and reads an
//! optional exported resource table. Only compiled with the `dylib`
//! feature; stub-backed hosts can build without it.

pub mod dylib;

pub use dylib::{
    DylibLoader, DylibModule, ResourceEntry, ResourceTable, RESOURCE_ABI_VERSION,
    RESOURCE_TABLE_SYMBOL,
};
