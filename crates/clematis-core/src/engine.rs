//! The simulation engine: owns per-station state and the random source and
//! runs the per-tick pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A frozen [`Topology`] (stations and precedence edges, cached order)
//! - Per-station state (SoA, indexed by [`NodeId`]): buffer level, occupancy,
//!   current and previous classification
//! - A [`SimState`] (tick counter)
//! - A [`RandomSource`] consumed in one tick-ordered sequence
//!
//! # Tick pipeline
//!
//! Each `step()` visits stations in topological order. For each station it:
//! 1. **Classify** -- starved / blocked / working from the live buffer levels
//! 2. **Aggregate** -- fold the state into the per-step summary and counts
//! 3. **Produce** -- working stations draw once and move material downstream
//!
//! Then it increments the tick counter and returns a [`TickReport`].
//!
//! Deliveries made by a station are visible to its successors later in the
//! same tick, so a chain can drain and refill within a single step. Stations
//! within a tick are therefore processed sequentially.

use crate::classify::{BufferView, NodeState, StepAggregate, classify};
use crate::fixed::{Fixed64, Ticks};
use crate::id::NodeId;
use crate::production::{ProductionOutcome, attempt_production};
use crate::query::NodeSnapshot;
use crate::report::{SinkError, StateCounts, TickReport, TickSink};
use crate::rng::{RandomSource, SimRng};
use crate::sim::{SimState, StateDigest};
use crate::topology::Topology;
use std::hash::Hasher;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug, Clone)]
pub struct Engine<R = SimRng> {
    topology: Topology,

    /// Simulation state (tick counter).
    pub sim_state: SimState,

    rng: R,

    // -- Per-station state (SoA, indexed by NodeId) --
    levels: Vec<Fixed64>,
    occupancy: Vec<Fixed64>,
    states: Vec<NodeState>,
    previous_states: Vec<NodeState>,
}

impl Engine<SimRng> {
    /// Create an engine driven by a [`SimRng`] with the given seed.
    pub fn new(topology: Topology, seed: u64) -> Self {
        Self::with_rng(topology, SimRng::new(seed))
    }
}

impl<R: RandomSource> Engine<R> {
    /// Create an engine with an explicit random source.
    ///
    /// All buffers start empty and every station starts classified starved.
    pub fn with_rng(topology: Topology, rng: R) -> Self {
        let n = topology.node_count();
        log::info!(
            "engine created: {} stations, {} edges, {} production steps",
            n,
            topology.edge_count(),
            topology.step_count()
        );
        Self {
            topology,
            sim_state: SimState::new(),
            rng,
            levels: vec![Fixed64::ZERO; n],
            occupancy: vec![Fixed64::ZERO; n],
            states: vec![NodeState::Starved; n],
            previous_states: vec![NodeState::Starved; n],
        }
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run a single tick.
    pub fn step(&mut self) -> TickReport {
        self.step_internal()
    }

    /// Run a single tick and write its record to `sink`.
    ///
    /// The header is written first when the engine has not run any tick yet.
    pub fn step_with_sink<S: TickSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<TickReport, SinkError> {
        if self.sim_state.is_initial() {
            sink.write_header()?;
        }
        let report = self.step_internal();
        sink.write_record(&report.record())?;
        Ok(report)
    }

    /// Run `ticks` ticks and collect their reports.
    pub fn run(&mut self, ticks: Ticks) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step_internal()).collect()
    }

    // -----------------------------------------------------------------------
    // Internal: single tick
    // -----------------------------------------------------------------------

    fn step_internal(&mut self) -> TickReport {
        let tick = self.sim_state.tick + 1;
        let mut aggregate = StepAggregate::new(self.topology.step_count());
        let mut counts = StateCounts::default();
        let mut changed_state = 0u32;
        let mut total_production = Fixed64::ZERO;

        for &node in self.topology.topological_order() {
            let idx = node.index();
            let attrs = self.topology.attrs(node);

            let successors = self.topology.successors(node).iter().map(|&s| BufferView {
                level: self.levels[s.index()],
                capacity: self.topology.attrs(s).buffer_capacity,
            });
            let has_predecessors = !self.topology.predecessors(node).is_empty();
            let state = classify(self.levels[idx], has_predecessors, successors);

            self.previous_states[idx] = self.states[idx];
            self.states[idx] = state;
            if state != self.previous_states[idx] {
                changed_state += 1;
            }
            aggregate.observe(attrs.production_step, state);
            counts.add(state);

            if state != NodeState::Working {
                continue;
            }

            let outcome =
                attempt_production(&self.topology, node, &mut self.levels, &mut self.rng);
            match outcome {
                ProductionOutcome::Failed => {
                    log::trace!("tick {tick}: {node} failed");
                }
                ProductionOutcome::Produced { .. } => {
                    total_production = total_production.saturating_add(outcome.finished_goods());
                    self.occupancy[idx] = self.levels[idx] / attrs.buffer_capacity;
                }
            }
        }

        self.sim_state.advance();

        log::debug!(
            "tick {tick}: starved={} blocked={} working={} production={}",
            counts.starved,
            counts.blocked,
            counts.working,
            total_production
        );

        TickReport {
            tick,
            total_production,
            counts,
            changed_state,
            step_aggregate: aggregate,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of completed ticks.
    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    /// The random source (read-only).
    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn buffer_level(&self, node: NodeId) -> Option<Fixed64> {
        self.levels.get(node.index()).copied()
    }

    pub fn occupancy(&self, node: NodeId) -> Option<Fixed64> {
        self.occupancy.get(node.index()).copied()
    }

    /// Classification from the most recent tick.
    pub fn node_state(&self, node: NodeId) -> Option<NodeState> {
        self.states.get(node.index()).copied()
    }

    pub fn snapshot_node(&self, node: NodeId) -> Option<NodeSnapshot> {
        let attrs = self.topology.attributes(node)?;
        let idx = node.index();
        Some(NodeSnapshot {
            id: node,
            production_step: attrs.production_step,
            buffer_level: self.levels[idx],
            buffer_capacity: attrs.buffer_capacity,
            occupancy: self.occupancy[idx],
            state: self.states[idx],
            previous_state: self.previous_states[idx],
            predecessors: self.topology.predecessors(node).to_vec(),
            successors: self.topology.successors(node).to_vec(),
        })
    }

    /// Snapshots of every station, in id order.
    pub fn snapshot_all_nodes(&self) -> Vec<NodeSnapshot> {
        self.topology
            .nodes()
            .filter_map(|(id, _)| self.snapshot_node(id))
            .collect()
    }

    /// Hash of the tick counter, every buffer level and every classification.
    pub fn state_hash(&self) -> u64 {
        let mut digest = StateDigest::new();
        digest.write_u64(self.sim_state.tick);
        for (&level, &state) in self.levels.iter().zip(&self.states) {
            digest.station(level, state);
        }
        digest.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
