//! Tracing subscriber setup.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;

/// Installs the global subscriber.
///
/// `RUST_LOG`, when set, overrides `LOG_LEVEL`. `LOG_PRETTY=true` writes
/// human-readable lines; otherwise one JSON object per event.
///
/// # Errors
///
/// Fails if the level is not a valid filter or a subscriber is already set.
pub fn init(config: &LoggerConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| anyhow!("Invalid LOG_LEVEL '{}': {}", config.level, e))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.pretty {
        builder.try_init()
    } else {
        builder.json().flatten_event(true).try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
