//! Engine Configuration
//!
//! Business rules that belong to a certification methodology rather than
//! to the code: tolerances, sample thresholds, rounding and the material
//! table. Every field has a default, so an empty file is a valid config.
//!
//! ```toml
//! mass_balance_tolerance = 0.01
//! certification_threshold_percent = 90.0
//! display_decimals = 2
//! include_material_breakdown = true
//!
//! [sample_adequacy]
//! min_sample_kg = 50.0
//! min_sample_fraction = 0.10
//!
//! [labels]
//! source = "Campus Waste"
//!
//! [materials.pallets]
//! divertible = true
//! destination = "reuse"
//!
//! [telemetry]
//! filter = "info,diversion_flow=debug"
//! ```

use crate::error::ConfigError;
use crate::telemetry::TelemetryConfig;
use diversion_flow::{ValidationContext, DEFAULT_MASS_BALANCE_TOLERANCE};
use diversion_metrics::{
    RatePolicy, SampleAdequacyRule, DEFAULT_CERTIFICATION_THRESHOLD_PERCENT,
    DEFAULT_DISPLAY_DECIMALS,
};
use diversion_model::{LabelConfig, MaterialTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Largest supported display precision
pub const MAX_DISPLAY_DECIMALS: u32 = 6;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Relative source/destination mismatch tolerated by the validator
    pub mass_balance_tolerance: f64,
    /// Minimum-sample rule for quartering audits
    pub sample_adequacy: SampleAdequacyRule,
    /// Rate at or above which a result is flagged certified
    pub certification_threshold_percent: f64,
    /// Decimal places in reported percentages
    pub display_decimals: u32,
    /// Insert per-material nodes between process and destination
    pub include_material_breakdown: bool,
    /// Display labels for flow graph nodes
    pub labels: LabelConfig,
    /// Material classification table; replaces the built-in table when set
    pub materials: MaterialTable,
    /// Tracing subscriber settings
    pub telemetry: TelemetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mass_balance_tolerance: DEFAULT_MASS_BALANCE_TOLERANCE,
            sample_adequacy: SampleAdequacyRule::default(),
            certification_threshold_percent: DEFAULT_CERTIFICATION_THRESHOLD_PERCENT,
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
            include_material_breakdown: false,
            labels: LabelConfig::default(),
            materials: MaterialTable::municipal_default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a config file; the format follows the extension.
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match extension.as_str() {
            "toml" => Self::parse_toml(&text)?,
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    /// [`ConfigError`] if the text cannot be parsed or validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_toml(text)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Check every value is in range.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.mass_balance_tolerance;
        if !(tolerance.is_finite() && (0.0..1.0).contains(&tolerance)) {
            return Err(ConfigError::invalid(
                "mass_balance_tolerance",
                format!("must be in [0, 1), got {tolerance}"),
            ));
        }

        let min_kg = self.sample_adequacy.min_sample_kg;
        if !(min_kg.is_finite() && min_kg >= 0.0) {
            return Err(ConfigError::invalid(
                "sample_adequacy.min_sample_kg",
                format!("must be a non-negative number, got {min_kg}"),
            ));
        }

        let fraction = self.sample_adequacy.min_sample_fraction;
        if !(fraction.is_finite() && (0.0..=1.0).contains(&fraction)) {
            return Err(ConfigError::invalid(
                "sample_adequacy.min_sample_fraction",
                format!("must be in [0, 1], got {fraction}"),
            ));
        }

        let threshold = self.certification_threshold_percent;
        if !(threshold.is_finite() && (0.0..=100.0).contains(&threshold)) {
            return Err(ConfigError::invalid(
                "certification_threshold_percent",
                format!("must be in [0, 100], got {threshold}"),
            ));
        }

        if self.display_decimals > MAX_DISPLAY_DECIMALS {
            return Err(ConfigError::invalid(
                "display_decimals",
                format!(
                    "must be at most {MAX_DISPLAY_DECIMALS}, got {}",
                    self.display_decimals
                ),
            ));
        }

        self.telemetry.validate()
    }

    /// Validator context for these settings
    #[must_use]
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            mass_balance_tolerance: self.mass_balance_tolerance,
        }
    }

    /// Rounding and certification policy for these settings
    #[must_use]
    pub fn rate_policy(&self) -> RatePolicy {
        RatePolicy {
            display_decimals: self.display_decimals,
            certification_threshold_percent: self.certification_threshold_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diversion_model::DispositionClass;

    #[test]
    fn empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.materials.is_known("paper"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            certification_threshold_percent = 75.0

            [sample_adequacy]
            min_sample_kg = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.certification_threshold_percent, 75.0);
        assert_eq!(config.sample_adequacy.min_sample_kg, 25.0);
        assert_eq!(config.sample_adequacy.min_sample_fraction, 0.10);
        assert_eq!(config.mass_balance_tolerance, 0.01);
    }

    #[test]
    fn material_table_replaces_builtin() {
        let config = EngineConfig::from_toml_str(
            r#"
            [materials.Pallets]
            divertible = true
            destination = "reuse"
            "#,
        )
        .unwrap();

        let pallets = config.materials.classify("pallets");
        assert!(pallets.divertible);
        assert_eq!(pallets.destination, Some(DispositionClass::Reuse));
        assert!(!config.materials.is_known("paper"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            ("mass_balance_tolerance = 1.5", "mass_balance_tolerance"),
            ("mass_balance_tolerance = -0.1", "mass_balance_tolerance"),
            ("certification_threshold_percent = 120.0", "certification_threshold_percent"),
            ("display_decimals = 9", "display_decimals"),
            ("[sample_adequacy]\nmin_sample_fraction = 2.0", "min_sample_fraction"),
            ("[sample_adequacy]\nmin_sample_kg = -1.0", "min_sample_kg"),
            ("[telemetry]\nfilter = \"x=loud\"", "telemetry.filter"),
        ];
        for (text, field) in cases {
            let err = EngineConfig::from_toml_str(text).unwrap_err();
            assert!(
                err.to_string().contains(field),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("display_decimals = \"two\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidToml(_)));
    }

    #[test]
    fn derived_component_settings() {
        let config = EngineConfig {
            mass_balance_tolerance: 0.05,
            display_decimals: 1,
            ..EngineConfig::default()
        };
        assert_eq!(config.validation_context().mass_balance_tolerance, 0.05);
        assert_eq!(config.rate_policy().display_decimals, 1);
        assert_eq!(config.rate_policy().certification_threshold_percent, 90.0);
    }
}
