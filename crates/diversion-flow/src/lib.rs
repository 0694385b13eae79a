//! Diversion Flow
//!
//! Directed flow graphs that connect total waste generation to final
//! dispositions, with structural and mass-balance validation.
//!
//! # Two Steps
//!
//! 1. **Build**: [`FlowGraphBuilder`] aggregates a [`RecordsByClass`]
//!    snapshot into `source → process → destination` edges. The result is
//!    conserved by construction: the source total and destination total
//!    are derived from the same per-class sums.
//! 2. **Validate**: [`FlowGraphValidator`] inspects any [`FlowGraph`]
//!    (built or received from elsewhere) and returns a
//!    [`ValidationReport`] listing every problem it finds.
//!
//! # Example
//!
//! ```rust
//! use diversion_flow::{FlowGraphBuilder, FlowGraphValidator};
//! use diversion_model::{DispositionClass, LabelConfig, RecordsByClass, WeightRecord};
//!
//! let records = RecordsByClass::new()
//!     .with(WeightRecord::new("paper", 100.0, DispositionClass::Recycling)?)
//!     .with(WeightRecord::new("mixed", 150.0, DispositionClass::Landfill)?);
//!
//! let graph = FlowGraphBuilder::new(LabelConfig::default()).build(&records);
//! let report = FlowGraphValidator::new().validate(&graph);
//!
//! assert!(report.is_valid);
//! assert_eq!(report.source_total, 250.0);
//! # Ok::<(), diversion_model::ModelError>(())
//! ```
//!
//! [`RecordsByClass`]: diversion_model::RecordsByClass

mod builder;
mod error;
mod graph;
pub mod ids;
mod validator;

pub use builder::{build_flow_graph, FlowGraphBuilder};
pub use error::FlowError;
pub use graph::{FlowEdge, FlowGraph, FlowNode, NodeRole};
pub use validator::{
    validate_flow_graph, FlowGraphValidator, GraphIssue, Severity, ValidationContext,
    ValidationReport, DEFAULT_MASS_BALANCE_TOLERANCE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
