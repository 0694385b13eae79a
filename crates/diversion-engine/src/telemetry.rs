//! Tracing setup
//!
//! Library crates only emit `tracing` events. Binaries and test harnesses
//! that want to see them call [`init_tracing`] once at startup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Default filter directive
pub const DEFAULT_FILTER: &str = "info";

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info,diversion_flow=debug`
    pub filter: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Override the filter directive
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Toggle JSON output
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Check that the filter directive parses.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] naming `telemetry.filter`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.filter)
            .map(drop)
            .map_err(|e| ConfigError::invalid("telemetry.filter", e.to_string()))
    }

    fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
                .map_err(|e| ConfigError::invalid("RUST_LOG", e.to_string())),
            _ => EnvFilter::try_new(&self.filter)
                .map_err(|e| ConfigError::invalid("telemetry.filter", e.to_string())),
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns
/// `Ok(false)` if another subscriber was already installed.
///
/// # Errors
/// [`ConfigError::InvalidValue`] if the active filter directive is malformed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<bool, ConfigError> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    Ok(installed)
}
