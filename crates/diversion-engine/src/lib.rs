//! Diversion Engine
//!
//! In-process facade over the diversion workspace: builds flow graphs from
//! classified weight records, validates them, computes diversion rates and
//! extrapolates quartering audits, all under one [`EngineConfig`].
//!
//! # Architecture
//!
//! ```text
//! RecordsByClass ──► build_flow_graph ──► FlowGraph ──► validate_flow_graph ──► ValidationReport
//!                                             │
//!                                             ▼
//! Breakdown ────────────────────────► compute_diversion ──► DiversionResult
//!
//! AuditSample + MaterialTable ──► extrapolate_audit ──► ExtrapolatedRecord[]
//! ```
//!
//! # Usage
//!
//! ```rust
//! use diversion_engine::prelude::*;
//!
//! let engine = DiversionEngine::new(EngineConfig::default())?;
//! let records = RecordsByClass::new()
//!     .with(WeightRecord::new("paper", 100.0, DispositionClass::Recycling)?)
//!     .with(WeightRecord::new("food", 50.0, DispositionClass::Compost)?)
//!     .with(WeightRecord::new("mixed", 150.0, DispositionClass::Landfill)?);
//!
//! let graph = engine.build_flow_graph(&records);
//! assert!(engine.validate_flow_graph(&graph).is_valid);
//!
//! let result = engine.compute_diversion(&graph)?;
//! assert_eq!(result.diversion_rate_percent, 50.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod engine;
pub mod error;
pub mod period;
pub mod telemetry;

pub use config::EngineConfig;
pub use engine::{DiversionEngine, DiversionInput, PeriodReport, PeriodSummary};
pub use error::{ConfigError, EngineError, PeriodError};
pub use period::{PeriodSpec, ReportingPeriod};
pub use telemetry::{init_tracing, TelemetryConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for engine callers
pub mod prelude {
    pub use crate::{
        DiversionEngine, DiversionInput, EngineConfig, EngineError, PeriodSummary,
        ReportingPeriod,
    };
    pub use diversion_flow::{FlowEdge, FlowGraph, FlowNode, GraphIssue, ValidationReport};
    pub use diversion_metrics::{AuditReport, AuditSample, Breakdown, DiversionResult};
    pub use diversion_model::{
        DispositionClass, LabelConfig, MaterialTable, RecordsByClass, WeightRecord,
    };
}
