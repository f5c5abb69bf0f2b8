//! Tracing and logging (shared setup).

/// Initialize process-wide observability from the environment.
///
/// An invalid `SITEGATE_LOG_FORMAT` falls back to the defaults and is
/// reported as a warning once the subscriber is installed.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    match ObservabilityConfig::from_env() {
        Ok(config) => tracing::init(&config),
        Err(err) => {
            tracing::init(&ObservabilityConfig::default());
            ::tracing::warn!(error = %err, "invalid logging configuration; using defaults");
        }
    }
}

/// Logging configuration.
pub mod config;

/// Tracing subscriber installation (filters, formats).
pub mod tracing;

pub use config::{ConfigError, LogFormat, ObservabilityConfig};
