//! Read-only query API for inspecting per-station state.
//!
//! Snapshot types are owned copies -- no references into internal engine
//! storage.

use crate::classify::NodeState;
use crate::fixed::Fixed64;
use crate::id::{NodeId, ProductionStep};

/// A read-only view of a single station after the most recent tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub production_step: ProductionStep,
    pub buffer_level: Fixed64,
    pub buffer_capacity: Fixed64,
    /// Level over capacity as of the station's last successful production.
    /// Not refreshed when only upstream deliveries changed the level.
    pub occupancy: Fixed64,
    pub state: NodeState,
    pub previous_state: NodeState,
    pub predecessors: Vec<NodeId>,
    pub successors: Vec<NodeId>,
}
