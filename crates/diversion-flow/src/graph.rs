//! Flow graph types
//!
//! A [`FlowGraph`] is plain immutable data: it is produced by
//! [`FlowGraphBuilder`](crate::FlowGraphBuilder) (or assembled with
//! [`FlowGraph::from_parts`] for inspection) and never mutated afterwards.

use crate::error::FlowError;
use crate::ids;
use diversion_model::DispositionClass;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a node in the source → process → destination flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Total generation
    Source,
    /// Category or material node between source and destination
    Process,
    /// Terminal facility
    Destination,
}

/// A node in the flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique id
    pub id: String,
    /// Human-readable label
    pub display_label: String,
    /// Role in the flow
    pub role: NodeRole,
    /// Explicit disposition class, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<DispositionClass>,
}

impl FlowNode {
    /// Node without an explicit disposition class
    pub fn new(id: impl Into<String>, display_label: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id: id.into(),
            display_label: display_label.into(),
            role,
            disposition: None,
        }
    }

    /// Attach an explicit disposition class
    #[must_use]
    pub fn with_disposition(mut self, class: DispositionClass) -> Self {
        self.disposition = Some(class);
        self
    }

    /// Disposition class: explicit tag, else encoded in the id, else the label
    #[must_use]
    pub fn disposition_class(&self) -> Option<DispositionClass> {
        self.disposition
            .or_else(|| ids::class_from_id(&self.id))
            .or_else(|| self.display_label.parse().ok())
    }
}

/// A weighted, directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Id of the node the mass leaves
    pub source_node_id: String,
    /// Id of the node the mass enters
    pub target_node_id: String,
    /// Mass carried, in kilograms
    pub kilograms: f64,
}

impl FlowEdge {
    /// New edge
    pub fn new(source: impl Into<String>, target: impl Into<String>, kilograms: f64) -> Self {
        Self {
            source_node_id: source.into(),
            target_node_id: target.into(),
            kilograms,
        }
    }
}

/// Nodes and weighted edges for one reporting period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Graph with no nodes and no edges ("no data")
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a graph from raw parts without any checks.
    ///
    /// Use [`FlowGraphValidator`](crate::FlowGraphValidator) to inspect the
    /// result; this constructor exists for graphs that arrive from outside
    /// the builder.
    #[must_use]
    pub fn from_parts(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Nodes in construction order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Edges in construction order
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Node count
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edge count
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True for the "no data" graph
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// First node with `id`
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// True when a node with `id` exists
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Nodes with the given role
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &FlowNode> + '_ {
        self.nodes.iter().filter(move |n| n.role == role)
    }

    /// Summed mass of edges leaving node `id`.
    ///
    /// # Errors
    /// [`FlowError::UnknownNode`] if `id` is not in the graph.
    pub fn outflow(&self, id: &str) -> Result<f64, FlowError> {
        self.require(id)?;
        Ok(self
            .edges
            .iter()
            .filter(|e| e.source_node_id == id)
            .map(|e| e.kilograms)
            .sum())
    }

    /// Summed mass of edges entering node `id`.
    ///
    /// # Errors
    /// [`FlowError::UnknownNode`] if `id` is not in the graph.
    pub fn inflow(&self, id: &str) -> Result<f64, FlowError> {
        self.require(id)?;
        Ok(self
            .edges
            .iter()
            .filter(|e| e.target_node_id == id)
            .map(|e| e.kilograms)
            .sum())
    }

    /// Mass leaving source-role nodes
    #[must_use]
    pub fn source_total(&self) -> f64 {
        self.role_total(NodeRole::Source, |edge| edge.source_node_id.as_str())
    }

    /// Mass entering destination-role nodes
    #[must_use]
    pub fn destination_total(&self) -> f64 {
        self.role_total(NodeRole::Destination, |edge| edge.target_node_id.as_str())
    }

    /// Mass entering destination nodes, keyed by the destination's class.
    ///
    /// # Errors
    /// [`FlowError::UnclassifiedDestination`] if a destination node that
    /// receives mass carries no resolvable class.
    pub fn destination_totals(&self) -> Result<BTreeMap<DispositionClass, f64>, FlowError> {
        let mut totals = BTreeMap::new();
        for node in self.nodes_with_role(NodeRole::Destination) {
            let inflow = self.inflow(&node.id)?;
            if inflow == 0.0 {
                continue;
            }
            let class = node
                .disposition_class()
                .ok_or_else(|| FlowError::UnclassifiedDestination(node.id.clone()))?;
            *totals.entry(class).or_insert(0.0) += inflow;
        }
        Ok(totals)
    }

    /// Per-node sums in node order, then their total.
    ///
    /// Each node's sum runs in edge order, the same order the builder used
    /// for the class total, so built graphs balance bit for bit.
    fn role_total(&self, role: NodeRole, endpoint: impl Fn(&FlowEdge) -> &str) -> f64 {
        let mut per_node: IndexMap<&str, f64> = self
            .nodes_with_role(role)
            .map(|node| (node.id.as_str(), 0.0))
            .collect();
        for edge in self.edges.iter().filter(|e| e.kilograms.is_finite()) {
            if let Some(sum) = per_node.get_mut(endpoint(edge)) {
                *sum += edge.kilograms;
            }
        }
        per_node.values().sum()
    }

    fn require(&self, id: &str) -> Result<(), FlowError> {
        if self.contains_node(id) {
            Ok(())
        } else {
            Err(FlowError::UnknownNode(id.to_string()))
        }
    }
}
