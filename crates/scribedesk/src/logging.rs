//! Logging / tracing setup.
//!
//! The engine logs through both `tracing` (async paths) and `log` (registry
//! bookkeeping); `tracing-log` forwards the latter into the same subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Builds the filter from `RUST_LOG` when set, else from the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| ConfigError::Validation {
        message: format!("Invalid log level '{}': {}", config.level, e),
    })
}

/// Installs the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = env_filter(config)?;

    // A logger may already be set (tests, embedding hosts).
    let _ = tracing_log::LogTracer::init();

    let result = if config.json {
        tracing::subscriber::set_global_default(
            Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr)),
        )
    } else {
        tracing::subscriber::set_global_default(
            Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr)),
        )
    };

    if let Err(e) = result {
        log::debug!("Logging already initialized: {}", e);
    }

    Ok(())
}
