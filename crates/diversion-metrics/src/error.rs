//! Error types for diversion metrics

use diversion_flow::FlowError;
use diversion_model::ModelError;

/// Metrics errors
///
/// Only contract violations surface here. Unusual but legal data (a small
/// sample, an empty audit, zero generation) is reported through flags and
/// warnings instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// Negative or non-finite input weight
    #[error(transparent)]
    InvalidInput(#[from] ModelError),

    /// Graph could not be read as a flow of classified mass
    #[error("flow graph error: {0}")]
    Flow(#[from] FlowError),
}
