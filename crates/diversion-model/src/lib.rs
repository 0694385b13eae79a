//! Diversion Model
//!
//! Shared domain types for waste diversion analytics.
//!
//! # Core Concepts
//!
//! - [`DispositionClass`]: closed set of final-handling categories
//! - [`WeightRecord`]: a named material with a non-negative mass
//! - [`RecordsByClass`]: records grouped into disposition buckets
//! - [`MaterialTable`]: configurable material → divertible lookup
//! - [`LabelConfig`]: display labels for graph nodes
//!
//! # Example
//!
//! ```rust
//! use diversion_model::{DispositionClass, RecordsByClass, WeightRecord};
//!
//! let records: RecordsByClass = [
//!     WeightRecord::new("paper", 100.0, DispositionClass::Recycling)?,
//!     WeightRecord::new("mixed", 150.0, DispositionClass::Landfill)?,
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(records.grand_total(), 250.0);
//! # Ok::<(), diversion_model::ModelError>(())
//! ```

mod disposition;
mod error;
mod labels;
mod materials;
mod record;

pub use disposition::DispositionClass;
pub use error::ModelError;
pub use labels::LabelConfig;
pub use materials::{normalize_material_name, MaterialClassification, MaterialTable};
pub use record::{MaterialTotal, RecordsByClass, WeightRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
