//! Flow Graph Validator
//!
//! Pure inspection of a [`FlowGraph`]. Every problem is collected into a
//! [`ValidationReport`]; the validator never fails and never stops at the
//! first finding, so one report carries every diagnostic.

use crate::error::FlowError;
use crate::graph::{FlowGraph, NodeRole};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Default relative tolerance for the mass-balance check
pub const DEFAULT_MASS_BALANCE_TOLERANCE: f64 = 0.01;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks rendering; makes the report invalid
    Error,
    /// Advisory only
    Warning,
}

/// One finding about a flow graph
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphIssue {
    /// Edge references a node id that does not exist
    #[error("dangling edge #{index} '{source_id}' -> '{target_id}': missing node(s) {}", .missing.join(", "))]
    DanglingEdge {
        /// Position of the edge in the edge list
        index: usize,
        /// Id the edge starts from
        source_id: String,
        /// Id the edge points to
        target_id: String,
        /// Endpoint ids with no matching node
        missing: Vec<String>,
    },

    /// Edge weight is negative, NaN or infinite
    #[error("edge #{index} '{source_id}' -> '{target_id}' has invalid weight {kilograms}")]
    InvalidEdgeWeight {
        /// Position of the edge in the edge list
        index: usize,
        /// Id the edge starts from
        source_id: String,
        /// Id the edge points to
        target_id: String,
        /// The rejected weight
        kilograms: f64,
    },

    /// Zero-weight edge stored in the edge list
    #[error("edge #{index} '{source_id}' -> '{target_id}' carries zero weight")]
    ZeroWeightEdge {
        /// Position of the edge in the edge list
        index: usize,
        /// Id the edge starts from
        source_id: String,
        /// Id the edge points to
        target_id: String,
    },

    /// Edge from a node to itself
    #[error("edge #{index} is a self-loop on '{node_id}'")]
    SelfLoop {
        /// Position of the edge in the edge list
        index: usize,
        /// Node the edge starts and ends at
        node_id: String,
    },

    /// Two nodes share one id
    #[error("duplicate node id '{node_id}'")]
    DuplicateNode {
        /// Repeated id
        node_id: String,
    },

    /// Node not referenced by any edge
    #[error("orphan node '{node_id}' is not referenced by any edge")]
    OrphanNode {
        /// Unreferenced node
        node_id: String,
    },

    /// The flow contains a cycle
    #[error("cycle detected through node '{node_id}'")]
    CycleDetected {
        /// A node on the cycle
        node_id: String,
    },

    /// A non-empty graph without exactly one source node
    #[error("expected exactly one source node, found {found}")]
    SourceCount {
        /// Number of source nodes present
        found: usize,
    },

    /// Mass entering and leaving a process node differ beyond tolerance
    #[error("process node '{node_id}' receives {inflow} kg but emits {outflow} kg")]
    ProcessImbalance {
        /// Offending node
        node_id: String,
        /// Mass entering the node
        inflow: f64,
        /// Mass leaving the node
        outflow: f64,
    },

    /// Source and destination totals differ beyond tolerance
    #[error(
        "mass balance mismatch: source total {source_total} kg vs destination total \
         {destination_total} kg ({:.2}% difference, tolerance {:.2}%)",
        .relative_difference * 100.0,
        .tolerance * 100.0
    )]
    MassBalance {
        /// Mass leaving source nodes
        source_total: f64,
        /// Mass entering destination nodes
        destination_total: f64,
        /// Mismatch relative to the larger total
        relative_difference: f64,
        /// Tolerance in force
        tolerance: f64,
    },
}

impl GraphIssue {
    /// Severity of this finding
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::DanglingEdge { .. }
            | Self::InvalidEdgeWeight { .. }
            | Self::SelfLoop { .. }
            | Self::DuplicateNode { .. }
            | Self::CycleDetected { .. }
            | Self::MassBalance { .. } => Severity::Error,
            Self::ZeroWeightEdge { .. }
            | Self::OrphanNode { .. }
            | Self::SourceCount { .. }
            | Self::ProcessImbalance { .. } => Severity::Warning,
        }
    }
}

/// Outcome of validating one graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// False when any error was found
    pub is_valid: bool,
    /// Blocking findings
    pub errors: Vec<GraphIssue>,
    /// Advisory findings
    pub warnings: Vec<GraphIssue>,
    /// Mass leaving source-role nodes
    pub source_total: f64,
    /// Mass entering destination-role nodes
    pub destination_total: f64,
}

impl ValidationReport {
    /// Rendered error messages
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Rendered warning messages
    #[must_use]
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// True when there is at least one warning
    #[inline]
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of dangling-edge errors
    #[must_use]
    pub fn dangling_edge_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| matches!(e, GraphIssue::DanglingEdge { .. }))
            .count()
    }

    /// Keep the report if valid, otherwise turn its errors into a [`FlowError`].
    ///
    /// # Errors
    /// [`FlowError::InvalidGraph`] when the report holds any error.
    pub fn into_result(self) -> Result<Self, FlowError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(FlowError::InvalidGraph {
                errors: self.error_messages(),
            })
        }
    }
}

/// Context for validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationContext {
    /// Relative tolerance for source/destination and per-process balance
    pub mass_balance_tolerance: f64,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            mass_balance_tolerance: DEFAULT_MASS_BALANCE_TOLERANCE,
        }
    }
}

/// Structural and mass-balance validator
#[derive(Debug, Clone, Default)]
pub struct FlowGraphValidator {
    context: ValidationContext,
}

impl FlowGraphValidator {
    /// Validator with the default 1% tolerance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with a custom context
    #[must_use]
    pub fn with_context(context: ValidationContext) -> Self {
        Self { context }
    }

    /// Validator with a custom mass-balance tolerance
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self::with_context(ValidationContext {
            mass_balance_tolerance: tolerance,
        })
    }

    /// Active context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate a graph.
    ///
    /// Checks, in order:
    /// 1. Node ids are unique
    /// 2. Every edge resolves both endpoints and carries a usable weight
    /// 3. No node is orphaned
    /// 4. The flow is acyclic
    /// 5. Exactly one source node exists (non-empty graphs)
    /// 6. Process nodes conserve mass
    /// 7. Source total matches destination total
    #[must_use]
    pub fn validate(&self, graph: &FlowGraph) -> ValidationReport {
        let mut issues = Vec::new();

        let roles = self.check_nodes(graph, &mut issues);
        self.check_edges(graph, &roles, &mut issues);
        self.check_orphans(graph, &mut issues);
        self.check_cycles(graph, &roles, &mut issues);
        self.check_source_count(graph, &mut issues);
        self.check_process_balance(graph, &roles, &mut issues);

        let source_total = graph.source_total();
        let destination_total = graph.destination_total();
        self.check_mass_balance(source_total, destination_total, &mut issues);

        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.severity() == Severity::Error);

        let report = ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            source_total,
            destination_total,
        };

        if report.is_valid {
            debug!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                warnings = report.warnings.len(),
                source_total,
                "flow graph valid"
            );
        } else {
            warn!(
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                source_total,
                destination_total,
                "flow graph invalid"
            );
        }
        report
    }

    /// Duplicate ids; returns the role of each id (first occurrence wins)
    fn check_nodes<'g>(
        &self,
        graph: &'g FlowGraph,
        issues: &mut Vec<GraphIssue>,
    ) -> HashMap<&'g str, NodeRole> {
        let mut roles = HashMap::with_capacity(graph.node_count());
        let mut reported = HashSet::new();
        for node in graph.nodes() {
            if roles.contains_key(node.id.as_str()) {
                if reported.insert(node.id.as_str()) {
                    issues.push(GraphIssue::DuplicateNode {
                        node_id: node.id.clone(),
                    });
                }
            } else {
                roles.insert(node.id.as_str(), node.role);
            }
        }
        roles
    }

    fn check_edges(
        &self,
        graph: &FlowGraph,
        roles: &HashMap<&str, NodeRole>,
        issues: &mut Vec<GraphIssue>,
    ) {
        for (index, edge) in graph.edges().iter().enumerate() {
            let missing: Vec<String> = [&edge.source_node_id, &edge.target_node_id]
                .into_iter()
                .filter(|id| !roles.contains_key(id.as_str()))
                .fold(Vec::new(), |mut acc, id| {
                    if !acc.contains(id) {
                        acc.push(id.clone());
                    }
                    acc
                });
            if !missing.is_empty() {
                issues.push(GraphIssue::DanglingEdge {
                    index,
                    source_id: edge.source_node_id.clone(),
                    target_id: edge.target_node_id.clone(),
                    missing,
                });
            }

            if edge.source_node_id == edge.target_node_id {
                issues.push(GraphIssue::SelfLoop {
                    index,
                    node_id: edge.source_node_id.clone(),
                });
            }

            if !edge.kilograms.is_finite() || edge.kilograms < 0.0 {
                issues.push(GraphIssue::InvalidEdgeWeight {
                    index,
                    source_id: edge.source_node_id.clone(),
                    target_id: edge.target_node_id.clone(),
                    kilograms: edge.kilograms,
                });
            } else if edge.kilograms == 0.0 {
                issues.push(GraphIssue::ZeroWeightEdge {
                    index,
                    source_id: edge.source_node_id.clone(),
                    target_id: edge.target_node_id.clone(),
                });
            }
        }
    }

    fn check_orphans(&self, graph: &FlowGraph, issues: &mut Vec<GraphIssue>) {
        let referenced: HashSet<&str> = graph
            .edges()
            .iter()
            .flat_map(|e| [e.source_node_id.as_str(), e.target_node_id.as_str()])
            .collect();
        let mut seen = HashSet::new();
        for node in graph.nodes() {
            if !referenced.contains(node.id.as_str()) && seen.insert(node.id.as_str()) {
                issues.push(GraphIssue::OrphanNode {
                    node_id: node.id.clone(),
                });
            }
        }
    }

    /// Cycles over resolvable, non-self-loop edges
    fn check_cycles(
        &self,
        graph: &FlowGraph,
        roles: &HashMap<&str, NodeRole>,
        issues: &mut Vec<GraphIssue>,
    ) {
        let mut topology: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in roles.keys() {
            topology.add_node(*id);
        }
        for edge in graph.edges() {
            let (from, to) = (edge.source_node_id.as_str(), edge.target_node_id.as_str());
            if from != to && roles.contains_key(from) && roles.contains_key(to) {
                topology.add_edge(from, to, ());
            }
        }
        if let Err(cycle) = toposort(&topology, None) {
            issues.push(GraphIssue::CycleDetected {
                node_id: cycle.node_id().to_string(),
            });
        }
    }

    fn check_source_count(&self, graph: &FlowGraph, issues: &mut Vec<GraphIssue>) {
        if graph.nodes().is_empty() {
            return;
        }
        let found = graph.nodes_with_role(NodeRole::Source).count();
        if found != 1 {
            issues.push(GraphIssue::SourceCount { found });
        }
    }

    fn check_process_balance(
        &self,
        graph: &FlowGraph,
        roles: &HashMap<&str, NodeRole>,
        issues: &mut Vec<GraphIssue>,
    ) {
        let mut inflow: HashMap<&str, f64> = HashMap::new();
        let mut outflow: HashMap<&str, f64> = HashMap::new();
        for edge in graph.edges().iter().filter(|e| e.kilograms.is_finite()) {
            *outflow.entry(edge.source_node_id.as_str()).or_insert(0.0) += edge.kilograms;
            *inflow.entry(edge.target_node_id.as_str()).or_insert(0.0) += edge.kilograms;
        }

        let mut seen = HashSet::new();
        for node in graph.nodes_with_role(NodeRole::Process) {
            let id = node.id.as_str();
            if roles.get(id) != Some(&NodeRole::Process) || !seen.insert(id) {
                continue;
            }
            let inflow = inflow.get(id).copied().unwrap_or(0.0);
            let outflow = outflow.get(id).copied().unwrap_or(0.0);
            if relative_difference(inflow, outflow) > self.context.mass_balance_tolerance {
                issues.push(GraphIssue::ProcessImbalance {
                    node_id: node.id.clone(),
                    inflow,
                    outflow,
                });
            }
        }
    }

    fn check_mass_balance(
        &self,
        source_total: f64,
        destination_total: f64,
        issues: &mut Vec<GraphIssue>,
    ) {
        let relative = relative_difference(source_total, destination_total);
        if relative > self.context.mass_balance_tolerance {
            issues.push(GraphIssue::MassBalance {
                source_total,
                destination_total,
                relative_difference: relative,
                tolerance: self.context.mass_balance_tolerance,
            });
        }
    }
}

/// `|a - b| / max(|a|, |b|)`; zero when both sides are zero
fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}

/// Validate with the default tolerance
#[must_use]
pub fn validate_flow_graph(graph: &FlowGraph) -> ValidationReport {
    FlowGraphValidator::new().validate(graph)
}
