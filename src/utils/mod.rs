//! Utility modules for fault tolerance and resilience

pub mod error;
pub mod files;
pub mod lock;
pub mod logging;
pub mod template;
pub mod timeout;

// Re-export commonly used items
pub use error::{absorb, absorb_panic};
pub use files::{filename_to_regex, resource_name_regex, strip_extensions};
pub use lock::{with_lock, with_read_lock, with_write_lock};
pub use template::render;
pub use timeout::{
    run_with_timeout, with_custom_timeout, with_resolve_timeout, TimeoutError,
    DEFAULT_RESOLVE_TIMEOUT,
};
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
