//! Error types for flow graphs
//!
//! Data-quality findings are never errors here: they are reported as
//! [`GraphIssue`](crate::GraphIssue) values inside a
//! [`ValidationReport`](crate::ValidationReport). These errors cover
//! contract violations by the caller.

/// Flow graph errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// An id passed by the caller does not name a node in the graph
    #[error("unknown node: '{0}'")]
    UnknownNode(String),

    /// A destination node carries no resolvable disposition class
    #[error("destination node '{0}' has no disposition class")]
    UnclassifiedDestination(String),

    /// The graph failed structural or mass-balance validation
    #[error("flow graph failed validation with {} error(s): {}", .errors.len(), .errors.join("; "))]
    InvalidGraph {
        /// Rendered validation errors
        errors: Vec<String>,
    },
}

impl FlowError {
    /// True for errors caused by the graph content rather than the caller
    #[inline]
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::InvalidGraph { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_graph_lists_every_error() {
        let err = FlowError::InvalidGraph {
            errors: vec!["first".to_string(), "second".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("2 error(s)"));
        assert!(rendered.contains("first; second"));
        assert!(err.is_validation_failure());
    }

    #[test]
    fn unknown_node_names_the_id() {
        let err = FlowError::UnknownNode("ghost".to_string());
        assert_eq!(err.to_string(), "unknown node: 'ghost'");
        assert!(!err.is_validation_failure());
    }
}
