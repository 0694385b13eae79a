//! Error types for the engine facade

use chrono::NaiveDate;
use diversion_flow::FlowError;
use diversion_metrics::MetricsError;
use diversion_model::ModelError;
use std::path::PathBuf;

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Rejected record or weight
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Graph lookup or classification failure
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// Diversion or audit computation failure
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Configuration could not be loaded or is out of range
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reporting period is not a real calendar range
    #[error("reporting period error: {0}")]
    Period(#[from] PeriodError),
}

impl EngineError {
    /// True for caller-supplied data that violated a contract
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Model(_) | Self::Metrics(MetricsError::InvalidInput(_))
        )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// TOML text did not parse or did not match the config shape
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// YAML text did not parse or did not match the config shape
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// JSON text did not parse or did not match the config shape
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// File extension is not a supported format
    #[error("unsupported config format '{0}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat(String),

    /// A value parsed but is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Reporting period errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    /// Month outside 1..=12
    #[error("{year}-{month:02} is not a calendar month")]
    InvalidMonth {
        /// Requested year
        year: i32,
        /// Requested month
        month: u32,
    },

    /// Year chrono cannot represent
    #[error("year {0} is outside the supported calendar range")]
    OutOfRange(i32),

    /// Custom range with its end before its start
    #[error("period ends ({end}) before it starts ({start})")]
    EndsBeforeStart {
        /// First day requested
        start: NaiveDate,
        /// Last day requested
        end: NaiveDate,
    },
}
