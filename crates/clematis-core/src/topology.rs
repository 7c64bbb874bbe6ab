use crate::fixed::{Fixed64, fixed64_to_f64};
use crate::id::{NodeId, ProductionStep};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while assembling a topology.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("cycle detected in production network")]
    CycleDetected,
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("node {node}: invalid {attribute} ({value})")]
    InvalidAttribute {
        node: NodeId,
        attribute: &'static str,
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Highest accepted production step. The engine keeps one aggregate slot per
/// step up to the highest one in use, so this bounds that allocation.
pub const MAX_PRODUCTION_STEP: ProductionStep = u16::MAX as ProductionStep;

/// Static attributes of a work station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Units produced per tick when nothing limits the station.
    pub production_rate: Fixed64,
    /// Probability in [0, 1] that a production attempt fails.
    pub failure_rate: Fixed64,
    /// Capacity of the station's input buffer. Must be positive.
    pub buffer_capacity: Fixed64,
    /// Stage index used for step-level reporting.
    pub production_step: ProductionStep,
}

impl NodeAttributes {
    pub fn new(
        production_rate: Fixed64,
        failure_rate: Fixed64,
        buffer_capacity: Fixed64,
        production_step: ProductionStep,
    ) -> Self {
        Self {
            production_rate,
            failure_rate,
            buffer_capacity,
            production_step,
        }
    }

    fn validate(&self, node: NodeId) -> Result<(), TopologyError> {
        let invalid = |attribute, value: Fixed64| TopologyError::InvalidAttribute {
            node,
            attribute,
            value: fixed64_to_f64(value),
        };
        if self.production_rate < Fixed64::ZERO {
            return Err(invalid("production_rate", self.production_rate));
        }
        if self.failure_rate < Fixed64::ZERO || self.failure_rate > Fixed64::ONE {
            return Err(invalid("failure_rate", self.failure_rate));
        }
        if self.buffer_capacity <= Fixed64::ZERO {
            return Err(invalid("buffer_capacity", self.buffer_capacity));
        }
        if self.production_step > MAX_PRODUCTION_STEP {
            return Err(TopologyError::InvalidAttribute {
                node,
                attribute: "production_step",
                value: f64::from(self.production_step),
            });
        }
        Ok(())
    }
}

/// Neighbour lists for a single node, in edge insertion order.
#[derive(Debug, Clone, Default)]
struct NodeAdjacency {
    /// Nodes feeding this node.
    predecessors: Vec<NodeId>,
    /// Nodes this node feeds.
    successors: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects nodes and edges, then validates and freezes them into a
/// [`Topology`] in one step.
///
/// Edges are only checked on [`build`](TopologyBuilder::build), so nodes and
/// edges may be added in any order.
///
/// # Examples
///
/// ```
/// use clematis_core::fixed::Fixed64;
/// use clematis_core::topology::{NodeAttributes, TopologyBuilder};
///
/// let one = Fixed64::from_num(1);
/// let mut builder = TopologyBuilder::new();
/// let a = builder.add_node(NodeAttributes::new(one, Fixed64::ZERO, one, 0));
/// let b = builder.add_node(NodeAttributes::new(one, Fixed64::ZERO, one, 1));
/// builder.connect(a, b);
/// let topology = builder.build().unwrap();
/// assert_eq!(topology.topological_order(), &[a, b]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    nodes: Vec<NodeAttributes>,
    edges: Vec<(NodeId, NodeId)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Ids are assigned densely in call order.
    pub fn add_node(&mut self, attributes: NodeAttributes) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(attributes);
        id
    }

    /// Queue a directed edge `from -> to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.edges.push((from, to));
    }

    /// Number of nodes added so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Validate attributes and endpoints, then compute the topological order.
    pub fn build(self) -> Result<Topology, TopologyError> {
        for (idx, attrs) in self.nodes.iter().enumerate() {
            attrs.validate(NodeId(idx as u32))?;
        }

        let mut adjacency = vec![NodeAdjacency::default(); self.nodes.len()];
        for &(from, to) in &self.edges {
            if from.index() >= self.nodes.len() {
                return Err(TopologyError::NodeNotFound(from));
            }
            if to.index() >= self.nodes.len() {
                return Err(TopologyError::NodeNotFound(to));
            }
            adjacency[from.index()].successors.push(to);
            adjacency[to.index()].predecessors.push(from);
        }

        let order = topological_order(&adjacency)?;
        let step_count = self
            .nodes
            .iter()
            .map(|n| n.production_step as usize + 1)
            .max()
            .unwrap_or(0);

        log::debug!(
            "topology built: {} nodes, {} edges, {} production steps",
            self.nodes.len(),
            self.edges.len(),
            step_count
        );

        Ok(Topology {
            nodes: self.nodes,
            edges: self.edges,
            adjacency,
            order,
            step_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

/// An immutable, attributed production DAG with a cached visitation order.
///
/// Neighbour iteration order is the edge insertion order and never changes,
/// which makes tie-breaking in the engine reproducible.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<NodeAttributes>,
    edges: Vec<(NodeId, NodeId)>,
    adjacency: Vec<NodeAdjacency>,
    order: Vec<NodeId>,
    step_count: usize,
}

impl Topology {
    /// Nodes feeding `node`. Empty for unknown ids.
    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.index())
            .map(|adj| adj.predecessors.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes fed by `node`. Empty for unknown ids.
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.index())
            .map(|adj| adj.successors.as_slice())
            .unwrap_or(&[])
    }

    /// The visitation order, computed once at build time.
    pub fn topological_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of production steps: `max(production_step) + 1`, or 0 when
    /// the topology has no nodes.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Attributes of a node.
    pub fn attributes(&self, node: NodeId) -> Option<&NodeAttributes> {
        self.nodes.get(node.index())
    }

    /// Attributes of a node known to exist (ids taken from this topology).
    #[inline]
    pub(crate) fn attrs(&self, node: NodeId) -> &NodeAttributes {
        &self.nodes[node.index()]
    }

    /// Returns true if the node exists.
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    /// Iterate over all node ids and their attributes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeAttributes)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, attrs)| (NodeId(idx as u32), attrs))
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }
}

/// Kahn's algorithm over dense adjacency lists.
///
/// The queue is seeded in id order and successors are released in insertion
/// order, so the result is a pure function of the build sequence.
fn topological_order(adjacency: &[NodeAdjacency]) -> Result<Vec<NodeId>, TopologyError> {
    let mut in_degree: Vec<usize> = adjacency.iter().map(|a| a.predecessors.len()).collect();

    let mut queue: VecDeque<NodeId> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(idx, _)| NodeId(idx as u32))
        .collect();

    let mut order = Vec::with_capacity(adjacency.len());
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &dest in &adjacency[node.index()].successors {
            let deg = &mut in_degree[dest.index()];
            *deg -= 1;
            if *deg == 0 {
                queue.push_back(dest);
            }
        }
    }

    if order.len() < adjacency.len() {
        return Err(TopologyError::CycleDetected);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(step: ProductionStep) -> NodeAttributes {
        let one = Fixed64::from_num(1);
        NodeAttributes::new(one, Fixed64::ZERO, one, step)
    }

    /// Helper: a builder with `count` nodes, all in step 0.
    fn builder_with_nodes(count: usize) -> (TopologyBuilder, Vec<NodeId>) {
        let mut builder = TopologyBuilder::new();
        let ids = (0..count).map(|_| builder.add_node(attrs(0))).collect();
        (builder, ids)
    }

    #[test]
    fn ids_are_dense_in_insertion_order() {
        let (builder, nodes) = builder_with_nodes(3);
        assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        let topo = builder.build().unwrap();
        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.edge_count(), 0);
    }

    #[test]
    fn topological_sort_linear_chain() {
        let (mut builder, nodes) = builder_with_nodes(3);
        let [a, b, c] = [nodes[0], nodes[1], nodes[2]];
        // Added in reverse so the order can't fall out of id order by luck.
        builder.connect(b, c);
        builder.connect(a, b);
        let topo = builder.build().unwrap();
        assert_eq!(topo.topological_order(), &[a, b, c]);
    }

    #[test]
    fn topological_sort_respects_edges_against_id_order() {
        let (mut builder, nodes) = builder_with_nodes(3);
        // n2 -> n0 -> n1
        builder.connect(nodes[2], nodes[0]);
        builder.connect(nodes[0], nodes[1]);
        let topo = builder.build().unwrap();
        assert_eq!(topo.topological_order(), &[nodes[2], nodes[0], nodes[1]]);
    }

    #[test]
    fn topological_sort_diamond() {
        let (mut builder, nodes) = builder_with_nodes(4);
        let [a, b, c, d] = [nodes[0], nodes[1], nodes[2], nodes[3]];
        builder.connect(a, b);
        builder.connect(a, c);
        builder.connect(b, d);
        builder.connect(c, d);
        let topo = builder.build().unwrap();

        let order = topo.topological_order();
        let pos = |n: NodeId| order.iter().position(|&x| x == n).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(a) < pos(c));
        assert!(pos(b) < pos(d));
        assert!(pos(c) < pos(d));
    }

    #[test]
    fn cycle_detection() {
        let (mut builder, nodes) = builder_with_nodes(3);
        builder.connect(nodes[0], nodes[1]);
        builder.connect(nodes[1], nodes[2]);
        builder.connect(nodes[2], nodes[0]);
        assert_eq!(builder.build().unwrap_err(), TopologyError::CycleDetected);
    }

    #[test]
    fn self_loop_detected_as_cycle() {
        let (mut builder, nodes) = builder_with_nodes(1);
        builder.connect(nodes[0], nodes[0]);
        assert!(matches!(builder.build(), Err(TopologyError::CycleDetected)));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let (mut builder, nodes) = builder_with_nodes(2);
        builder.connect(nodes[0], NodeId(9));
        assert_eq!(
            builder.build().unwrap_err(),
            TopologyError::NodeNotFound(NodeId(9))
        );
    }

    #[test]
    fn adjacency_queries_keep_insertion_order() {
        let (mut builder, nodes) = builder_with_nodes(4);
        builder.connect(nodes[0], nodes[3]);
        builder.connect(nodes[0], nodes[1]);
        builder.connect(nodes[0], nodes[2]);
        builder.connect(nodes[2], nodes[3]);
        let topo = builder.build().unwrap();

        assert_eq!(topo.successors(nodes[0]), &[nodes[3], nodes[1], nodes[2]]);
        assert_eq!(topo.predecessors(nodes[3]), &[nodes[0], nodes[2]]);
        assert!(topo.predecessors(nodes[0]).is_empty());
        assert!(topo.successors(NodeId(99)).is_empty());
    }

    #[test]
    fn duplicate_edges_allowed() {
        let (mut builder, nodes) = builder_with_nodes(2);
        builder.connect(nodes[0], nodes[1]);
        builder.connect(nodes[0], nodes[1]);
        let topo = builder.build().unwrap();
        assert_eq!(topo.edge_count(), 2);
        assert_eq!(topo.successors(nodes[0]).len(), 2);
        assert_eq!(topo.topological_order(), &[nodes[0], nodes[1]]);
    }

    #[test]
    fn step_count_is_max_step_plus_one() {
        let mut builder = TopologyBuilder::new();
        builder.add_node(attrs(0));
        builder.add_node(attrs(3));
        builder.add_node(attrs(1));
        let topo = builder.build().unwrap();
        assert_eq!(topo.step_count(), 4);
    }

    #[test]
    fn empty_topology() {
        let topo = TopologyBuilder::new().build().unwrap();
        assert_eq!(topo.node_count(), 0);
        assert_eq!(topo.step_count(), 0);
        assert!(topo.topological_order().is_empty());
    }

    #[test]
    fn negative_production_rate_rejected() {
        let mut builder = TopologyBuilder::new();
        let mut bad = attrs(0);
        bad.production_rate = Fixed64::from_num(-1);
        let id = builder.add_node(bad);
        match builder.build() {
            Err(TopologyError::InvalidAttribute {
                node, attribute, ..
            }) => {
                assert_eq!(node, id);
                assert_eq!(attribute, "production_rate");
            }
            other => panic!("expected InvalidAttribute, got {other:?}"),
        }
    }

    #[test]
    fn failure_rate_outside_unit_interval_rejected() {
        let mut builder = TopologyBuilder::new();
        let mut bad = attrs(0);
        bad.failure_rate = Fixed64::from_num(1.5);
        builder.add_node(bad);
        assert!(matches!(
            builder.build(),
            Err(TopologyError::InvalidAttribute {
                attribute: "failure_rate",
                ..
            })
        ));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut builder = TopologyBuilder::new();
        let mut bad = attrs(0);
        bad.buffer_capacity = Fixed64::ZERO;
        builder.add_node(bad);
        assert!(matches!(
            builder.build(),
            Err(TopologyError::InvalidAttribute {
                attribute: "buffer_capacity",
                ..
            })
        ));
    }

    #[test]
    fn sparse_production_step_rejected() {
        let mut builder = TopologyBuilder::new();
        builder.add_node(attrs(MAX_PRODUCTION_STEP));
        let topo = builder.build().unwrap();
        assert_eq!(topo.step_count(), MAX_PRODUCTION_STEP as usize + 1);

        let mut builder = TopologyBuilder::new();
        builder.add_node(attrs(0));
        let far = builder.add_node(attrs(u32::MAX));
        assert_eq!(
            builder.build().unwrap_err(),
            TopologyError::InvalidAttribute {
                node: far,
                attribute: "production_step",
                value: 4294967295.0,
            }
        );
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(
            TopologyError::CycleDetected.to_string(),
            "cycle detected in production network"
        );
        assert_eq!(
            TopologyError::NodeNotFound(NodeId(4)).to_string(),
            "node not found: n4"
        );
    }
}
