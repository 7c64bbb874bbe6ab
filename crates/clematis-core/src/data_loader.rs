//! Data-driven topology loading from JSON.
//!
//! Feature-gated behind `data-loader`. A document lists node attributes in
//! id order and edges as `[from, to]` pairs:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "production_rate": 1.0, "failure_rate": 0.1, "buffer_capacity": 1.0, "production_step": 0 },
//!     { "production_rate": 1.0, "failure_rate": 0.1, "buffer_capacity": 1.0, "production_step": 1 }
//!   ],
//!   "edges": [[0, 1]]
//! }
//! ```

use crate::fixed::{fixed64_to_f64, try_f64_to_fixed64};
use crate::id::{NodeId, ProductionStep};
use crate::topology::{NodeAttributes, Topology, TopologyBuilder, TopologyError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// Malformed JSON, a missing attribute, a non-numeric attribute or a
    /// negative production step.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("node {index}: {attribute} is not representable ({value})")]
    Unrepresentable {
        index: usize,
        attribute: &'static str,
        value: f64,
    },
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level topology document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TopologyData {
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<[u32; 2]>,
}

/// JSON representation of one station. Every field is required.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeData {
    pub production_rate: f64,
    pub failure_rate: f64,
    pub buffer_capacity: f64,
    pub production_step: ProductionStep,
}

impl TopologyData {
    /// Capture an existing topology, e.g. one produced by a generator.
    pub fn from_topology(topology: &Topology) -> Self {
        let nodes = topology
            .nodes()
            .map(|(_, a)| NodeData {
                production_rate: fixed64_to_f64(a.production_rate),
                failure_rate: fixed64_to_f64(a.failure_rate),
                buffer_capacity: fixed64_to_f64(a.buffer_capacity),
                production_step: a.production_step,
            })
            .collect();
        let edges = topology.edges().map(|(from, to)| [from.0, to.0]).collect();
        Self { nodes, edges }
    }

    /// Validate and build the topology.
    pub fn into_topology(self) -> Result<Topology, DataLoadError> {
        let mut builder = TopologyBuilder::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let convert = |attribute, value: f64| {
                try_f64_to_fixed64(value).ok_or(DataLoadError::Unrepresentable {
                    index,
                    attribute,
                    value,
                })
            };
            builder.add_node(NodeAttributes::new(
                convert("production_rate", node.production_rate)?,
                convert("failure_rate", node.failure_rate)?,
                convert("buffer_capacity", node.buffer_capacity)?,
                node.production_step,
            ));
        }
        for [from, to] in self.edges {
            builder.connect(NodeId(from), NodeId(to));
        }
        Ok(builder.build()?)
    }
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a topology from a JSON string.
pub fn load_topology_json(json: &str) -> Result<Topology, DataLoadError> {
    let data: TopologyData = serde_json::from_str(json)?;
    data.into_topology()
}

/// Load a topology from JSON bytes.
pub fn load_topology_json_bytes(bytes: &[u8]) -> Result<Topology, DataLoadError> {
    let data: TopologyData = serde_json::from_slice(bytes)?;
    data.into_topology()
}

/// Serialize a topology to pretty-printed JSON.
pub fn topology_to_json(topology: &Topology) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&TopologyData::from_topology(topology))
}
