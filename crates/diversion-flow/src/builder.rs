//! Flow Graph Builder
//!
//! Aggregates weight records into a `source → process → destination` graph.
//! One process and one destination node exist per disposition class with
//! non-zero mass; classes without mass produce nothing. With the material
//! breakdown enabled, per-material nodes sit between each process node and
//! its destination.

use crate::graph::{FlowEdge, FlowGraph, FlowNode, NodeRole};
use crate::ids;
use diversion_model::{DispositionClass, LabelConfig, RecordsByClass};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Builder for per-period flow graphs
///
/// Usage:
/// ```rust,ignore
/// let builder = FlowGraphBuilder::new(LabelConfig::default());
/// let graph = builder.build(&records);
/// assert_eq!(graph.source_total(), graph.destination_total());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowGraphBuilder {
    labels: LabelConfig,
    material_breakdown: bool,
}

impl FlowGraphBuilder {
    /// Builder without material breakdown
    #[must_use]
    pub fn new(labels: LabelConfig) -> Self {
        Self {
            labels,
            material_breakdown: false,
        }
    }

    /// Enable or disable per-material sub-nodes
    #[must_use]
    pub fn with_material_breakdown(mut self, enabled: bool) -> Self {
        self.material_breakdown = enabled;
        self
    }

    /// Labels used for node display names
    #[inline]
    #[must_use]
    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    /// Whether per-material sub-nodes are produced
    #[inline]
    #[must_use]
    pub fn material_breakdown(&self) -> bool {
        self.material_breakdown
    }

    /// Build the graph for one record snapshot.
    ///
    /// Deterministic: identical input yields identical node ids, edge
    /// weights and ordering. Empty input (or all-zero input) yields
    /// [`FlowGraph::empty`].
    #[must_use]
    pub fn build(&self, records: &RecordsByClass) -> FlowGraph {
        let mut assembly = Assembly::default();

        for class in DispositionClass::ALL {
            let materials = self.materials_of(records, class);
            let total = if self.material_breakdown {
                materials.values().map(|m| m.kilograms).sum()
            } else {
                records.total(class)
            };

            if total <= 0.0 {
                trace!(class = %class, "skipping class without mass");
                continue;
            }

            let source = FlowNode::new(ids::SOURCE_ID, self.labels.source_label(), NodeRole::Source);
            let process = FlowNode::new(
                ids::process_id(class),
                self.labels.process_label(class),
                NodeRole::Process,
            )
            .with_disposition(class);
            let destination = FlowNode::new(
                ids::destination_id(class),
                self.labels.destination_label(class),
                NodeRole::Destination,
            )
            .with_disposition(class);

            assembly.connect(&source, &process, total);

            if self.material_breakdown {
                for (id, material) in materials {
                    let node = FlowNode::new(id, material.label, NodeRole::Process)
                        .with_disposition(class);
                    assembly.connect(&process, &node, material.kilograms);
                    assembly.connect(&node, &destination, material.kilograms);
                }
            } else {
                assembly.connect(&process, &destination, total);
            }
        }

        let graph = assembly.finish();
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            source_total = graph.source_total(),
            material_breakdown = self.material_breakdown,
            "flow graph built"
        );
        graph
    }

    /// Non-zero material totals of one class keyed by material node id.
    ///
    /// Keying by node id merges materials whose names differ only in
    /// punctuation, so every sub-node id stays unique.
    fn materials_of(
        &self,
        records: &RecordsByClass,
        class: DispositionClass,
    ) -> IndexMap<String, MaterialMass> {
        let mut materials: IndexMap<String, MaterialMass> = IndexMap::new();
        if !self.material_breakdown {
            return materials;
        }
        for total in records.material_totals(class) {
            if total.kilograms <= 0.0 {
                continue;
            }
            materials
                .entry(ids::material_id(class, &total.key))
                .or_insert_with(|| MaterialMass {
                    label: total.label.clone(),
                    kilograms: 0.0,
                })
                .kilograms += total.kilograms;
        }
        materials
    }
}

/// Build a flow graph with default options
#[must_use]
pub fn build_flow_graph(records: &RecordsByClass, labels: &LabelConfig) -> FlowGraph {
    FlowGraphBuilder::new(labels.clone()).build(records)
}

struct MaterialMass {
    label: String,
    kilograms: f64,
}

/// Nodes created on demand, deduplicated by id
#[derive(Default)]
struct Assembly {
    nodes: IndexMap<String, FlowNode>,
    edges: Vec<FlowEdge>,
}

impl Assembly {
    fn add_node(&mut self, node: &FlowNode) {
        if !self.nodes.contains_key(&node.id) {
            self.nodes.insert(node.id.clone(), node.clone());
        }
    }

    /// Adds both endpoints and the edge; zero-mass edges are dropped
    fn connect(&mut self, from: &FlowNode, to: &FlowNode, kilograms: f64) {
        if kilograms <= 0.0 {
            return;
        }
        self.add_node(from);
        self.add_node(to);
        self.edges
            .push(FlowEdge::new(from.id.clone(), to.id.clone(), kilograms));
    }

    fn finish(self) -> FlowGraph {
        FlowGraph::from_parts(self.nodes.into_values().collect(), self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diversion_model::WeightRecord;

    fn record(label: &str, kg: f64, class: DispositionClass) -> WeightRecord {
        WeightRecord::new(label, kg, class).unwrap()
    }

    fn balanced() -> RecordsByClass {
        RecordsByClass::new()
            .with(record("paper", 100.0, DispositionClass::Recycling))
            .with(record("food", 50.0, DispositionClass::Compost))
            .with(record("mixed", 150.0, DispositionClass::Landfill))
    }

    #[test]
    fn builds_one_process_and_destination_per_class() {
        let graph = FlowGraphBuilder::default().build(&balanced());

        // source + 3 × (process, destination)
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.contains_node("process_recycling"));
        assert!(graph.contains_node("destination_compost"));
        assert!(!graph.contains_node("process_reuse"));
        assert_eq!(graph.source_total(), 300.0);
        assert_eq!(graph.destination_total(), 300.0);
    }

    #[test]
    fn single_source_node() {
        let graph = FlowGraphBuilder::default().build(&balanced());
        assert_eq!(graph.nodes_with_role(NodeRole::Source).count(), 1);
        assert_eq!(graph.nodes()[0].id, ids::SOURCE_ID);
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let graph = FlowGraphBuilder::default().build(&RecordsByClass::new());
        assert!(graph.is_empty());
    }

    #[test]
    fn all_zero_input_yields_empty_graph() {
        let records = RecordsByClass::new()
            .with(record("paper", 0.0, DispositionClass::Recycling))
            .with(record("mixed", 0.0, DispositionClass::Landfill));
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);
        assert!(graph.is_empty());
    }

    #[test]
    fn zero_records_produce_no_edges() {
        let records = balanced().with(record("glass", 0.0, DispositionClass::Recycling));
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);

        assert!(!graph.contains_node("material_recycling_glass"));
        assert!(graph.edges().iter().all(|e| e.kilograms > 0.0));
    }

    #[test]
    fn labels_come_from_config() {
        let labels = LabelConfig::new()
            .with_source("Campus")
            .with_destination(DispositionClass::Landfill, "County Landfill");
        let graph = FlowGraphBuilder::new(labels).build(&balanced());

        assert_eq!(graph.node("source_total").unwrap().display_label, "Campus");
        assert_eq!(
            graph.node("destination_landfill").unwrap().display_label,
            "County Landfill"
        );
    }

    #[test]
    fn material_edges_sum_to_category_edge() {
        let records = balanced()
            .with(record("plastics", 20.5, DispositionClass::Recycling))
            .with(record("Paper", 4.25, DispositionClass::Recycling));
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);

        let category = graph.outflow("process_recycling").unwrap();
        assert_eq!(graph.inflow("process_recycling").unwrap(), category);
        assert_eq!(category, 124.75);
        assert_eq!(
            graph.inflow("material_recycling_paper").unwrap(),
            104.25
        );
        assert_eq!(graph.inflow("destination_recycling").unwrap(), category);
    }

    #[test]
    fn materials_with_colliding_slugs_share_a_node() {
        let records = RecordsByClass::new()
            .with(record("PET-1", 2.0, DispositionClass::Recycling))
            .with(record("pet 1", 3.0, DispositionClass::Recycling));
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);

        let materials: Vec<_> = graph
            .nodes()
            .iter()
            .filter(|n| n.id.starts_with("material_"))
            .collect();
        assert_eq!(materials.len(), 1);
        assert_eq!(graph.inflow("material_recycling_pet_1").unwrap(), 5.0);
    }

    #[test]
    fn non_ascii_materials_keep_their_own_nodes() {
        let records = RecordsByClass::new()
            .with(record("段ボール", 7.0, DispositionClass::Recycling))
            .with(record("新聞紙", 3.0, DispositionClass::Recycling));
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);

        assert_eq!(graph.inflow("material_recycling_段ボール").unwrap(), 7.0);
        assert_eq!(
            graph.node("material_recycling_新聞紙").unwrap().display_label,
            "新聞紙"
        );
    }

    #[test]
    fn free_function_matches_builder() {
        let labels = LabelConfig::default();
        assert_eq!(
            build_flow_graph(&balanced(), &labels),
            FlowGraphBuilder::new(labels).build(&balanced())
        );
    }
}
