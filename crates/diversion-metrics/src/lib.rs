//! Diversion Metrics
//!
//! Diversion rates over per-class mass, and quartering-audit
//! extrapolation from a sorted sample to a whole waste stream.
//!
//! # Example
//!
//! ```rust
//! use diversion_metrics::DiversionCalculator;
//!
//! let result = DiversionCalculator::new().from_breakdown(100.0, 50.0, 0.0, 150.0)?;
//! assert_eq!(result.total_generated, 300.0);
//! assert_eq!(result.diversion_rate_percent, 50.0);
//! # Ok::<(), diversion_metrics::MetricsError>(())
//! ```
//!
//! Audit samples go through [`AuditExtrapolator`]:
//!
//! ```rust
//! use diversion_metrics::{AuditExtrapolator, AuditSample};
//! use diversion_model::{DispositionClass, MaterialTable, WeightRecord};
//!
//! let sample = AuditSample::new(
//!     200.0,
//!     50.0,
//!     vec![
//!         WeightRecord::new("paper", 10.0, DispositionClass::Recycling)?,
//!         WeightRecord::new("mixed", 15.0, DispositionClass::Landfill)?,
//!     ],
//! )?;
//! let report = AuditExtrapolator::new().analyze(&sample, &MaterialTable::municipal_default())?;
//!
//! assert_eq!(report.factor, 4.0);
//! assert_eq!(report.diversion.diversion_rate_percent, 40.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod audit;
mod diversion;
mod error;

pub use audit::{
    compute_extrapolation_factor, AuditExtrapolator, AuditReport, AuditSample, AuditWarning,
    ExtrapolatedRecord, SampleAdequacyRule, DEFAULT_MIN_SAMPLE_FRACTION, DEFAULT_MIN_SAMPLE_KG,
};
pub use diversion::{
    round_to, Breakdown, DiversionCalculator, DiversionResult, RatePolicy,
    DEFAULT_CERTIFICATION_THRESHOLD_PERCENT, DEFAULT_DISPLAY_DECIMALS,
};
pub use error::MetricsError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
