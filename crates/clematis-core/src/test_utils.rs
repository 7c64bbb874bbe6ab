//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::fixed::Fixed64;
use crate::id::{NodeId, ProductionStep};
use crate::rng::RandomSource;
use crate::topology::{NodeAttributes, Topology, TopologyBuilder};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

pub fn attrs(rate: f64, failure: f64, capacity: f64, step: ProductionStep) -> NodeAttributes {
    NodeAttributes::new(fixed(rate), fixed(failure), fixed(capacity), step)
}

// ===========================================================================
// Topology builders
// ===========================================================================

/// A linear chain `n0 -> n1 -> ...` with the given attributes.
pub fn chain(nodes: &[NodeAttributes]) -> Topology {
    let mut builder = TopologyBuilder::new();
    let ids: Vec<NodeId> = nodes.iter().map(|&a| builder.add_node(a)).collect();
    for pair in ids.windows(2) {
        builder.connect(pair[0], pair[1]);
    }
    builder.build().expect("chain is acyclic")
}

/// Source -> middle -> sink, steps 0..2, no failures.
pub fn chain3(rate: Fixed64, capacity: Fixed64) -> (Topology, [NodeId; 3]) {
    let mut builder = TopologyBuilder::new();
    let ids = [0, 1, 2].map(|step| {
        builder.add_node(NodeAttributes::new(rate, Fixed64::ZERO, capacity, step))
    });
    builder.connect(ids[0], ids[1]);
    builder.connect(ids[1], ids[2]);
    (builder.build().expect("chain is acyclic"), ids)
}

/// One source (step 0) feeding one node per entry of `capacities` (step 1).
pub fn fan_out(rate: Fixed64, capacities: &[f64]) -> (Topology, NodeId, Vec<NodeId>) {
    let mut builder = TopologyBuilder::new();
    let src = builder.add_node(NodeAttributes::new(rate, Fixed64::ZERO, fixed(1.0), 0));
    let outs: Vec<NodeId> = capacities
        .iter()
        .map(|&cap| builder.add_node(NodeAttributes::new(rate, Fixed64::ZERO, fixed(cap), 1)))
        .collect();
    for &out in &outs {
        builder.connect(src, out);
    }
    (builder.build().expect("fan-out is acyclic"), src, outs)
}

/// A single isolated station.
pub fn single_node(rate: Fixed64, failure_rate: Fixed64) -> Topology {
    let mut builder = TopologyBuilder::new();
    builder.add_node(NodeAttributes::new(rate, failure_rate, fixed(1.0), 0));
    builder.build().expect("single node is acyclic")
}

/// `steps` layers of `width` stations, every station in layer i feeding
/// every station in layer i+1.
pub fn layered(steps: u32, width: u32, rate: f64, failure: f64, capacity: f64) -> Topology {
    let mut builder = TopologyBuilder::new();
    let layers: Vec<Vec<NodeId>> = (0..steps)
        .map(|step| {
            (0..width)
                .map(|_| builder.add_node(attrs(rate, failure, capacity, step)))
                .collect()
        })
        .collect();
    for pair in layers.windows(2) {
        for &from in &pair[0] {
            for &to in &pair[1] {
                builder.connect(from, to);
            }
        }
    }
    builder.build().expect("layered network is acyclic")
}

// ===========================================================================
// Random sources
// ===========================================================================

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<Fixed64>,
    taken: usize,
}

impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty(), "ScriptedRng needs at least one draw");
        Self {
            draws: draws.iter().map(|&d| fixed(d)).collect(),
            taken: 0,
        }
    }

    /// Always returns the same draw.
    pub fn constant(draw: f64) -> Self {
        Self::new(&[draw])
    }

    /// Number of draws consumed so far.
    pub fn draws_taken(&self) -> usize {
        self.taken
    }
}

impl RandomSource for ScriptedRng {
    fn next_uniform(&mut self) -> Fixed64 {
        let draw = self.draws[self.taken % self.draws.len()];
        self.taken += 1;
        draw
    }
}
