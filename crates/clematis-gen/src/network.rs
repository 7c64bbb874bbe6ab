//! The output of every generator: a layered topology plus the station ids
//! grouped by production step.

use clematis_core::id::{NodeId, ProductionStep};
use clematis_core::topology::{NodeAttributes, Topology, TopologyBuilder};

use crate::error::GeneratorError;

/// A generated production network.
#[derive(Debug, Clone)]
pub struct GeneratedNetwork {
    /// Station ids per production step, ascending within each step.
    pub work_stations: Vec<Vec<NodeId>>,
    pub topology: Topology,
}

impl GeneratedNetwork {
    pub fn step_count(&self) -> usize {
        self.work_stations.len()
    }

    /// Number of stations assigned to `step`, or 0 for an unknown step.
    pub fn machines_in_step(&self, step: ProductionStep) -> usize {
        self.work_stations
            .get(step as usize)
            .map_or(0, |stations| stations.len())
    }

    /// Stations of the first step (those without predecessors).
    pub fn entry_stations(&self) -> &[NodeId] {
        self.work_stations.first().map_or(&[], Vec::as_slice)
    }

    /// Stations of the last step (those producing finished goods).
    pub fn exit_stations(&self) -> &[NodeId] {
        self.work_stations.last().map_or(&[], Vec::as_slice)
    }
}

/// Build the topology for a step assignment.
///
/// `assignment[i]` is the step of station `i`; `attributes` maps a step to
/// the attributes shared by every station in it. Every station in step `k`
/// feeds every station in step `k + 1`.
pub(crate) fn assemble(
    assignment: &[ProductionStep],
    step_count: ProductionStep,
    attributes: impl Fn(ProductionStep) -> NodeAttributes,
) -> Result<GeneratedNetwork, GeneratorError> {
    let mut builder = TopologyBuilder::new();
    let mut work_stations: Vec<Vec<NodeId>> = vec![Vec::new(); step_count as usize];

    for &step in assignment {
        let id = builder.add_node(attributes(step));
        work_stations[step as usize].push(id);
    }

    for pair in work_stations.windows(2) {
        for &from in &pair[0] {
            for &to in &pair[1] {
                builder.connect(from, to);
            }
        }
    }

    let topology = builder.build()?;
    log::info!(
        "generated network: {} stations, {} edges, {} production steps",
        topology.node_count(),
        topology.edge_count(),
        step_count
    );

    Ok(GeneratedNetwork {
        work_stations,
        topology,
    })
}
