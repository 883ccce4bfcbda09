//! Logging initialization
//!
//! Thin wrappers over `tracing-subscriber` so embedders get consistent
//! resolver logging with one call. `RUST_LOG` always takes precedence over
//! configured filters; all initializers are no-ops when a global
//! subscriber is already installed (the embedding host usually owns it).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

fn env_filter(filter: Option<&str>) -> EnvFilter {
    // RUST_LOG wins; otherwise the configured filter; otherwise "info".
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter.unwrap_or("info"))
    }
}

/// Initialize human-readable logging to stderr.
///
/// # Arguments
/// * `filter` - Optional filter (e.g. "info", "module_resolver=debug").
///   Ignored when `RUST_LOG` is set.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter(filter))
        .try_init();
}

/// Initialize JSON logging for log aggregation systems.
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(env_filter(filter))
        .try_init();
}

/// Initialize logging from a [`LoggingConfig`].
///
/// Picks JSON output when the config asks for it and the `json-logging`
/// feature is compiled in; falls back to the human-readable format
/// otherwise.
pub fn init_logging_from_config(config: Option<&LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());
    let json_requested = config.map(|c| c.json_format).unwrap_or(false);

    #[cfg(feature = "json-logging")]
    if json_requested {
        init_json_logging(filter);
        return;
    }

    // Without the json-logging feature a JSON request falls back to the
    // human-readable format.
    let _ = json_requested;
    init_logging(filter);
}
