//! Determinism checking.
//!
//! Runs two engines built from the same topology and seed side by side and
//! compares their state hashes tick by tick.

use crate::engine::Engine;
use crate::fixed::Ticks;
use crate::topology::Topology;

/// Result of a determinism validation run.
#[derive(Debug)]
pub struct DeterminismResult {
    /// Whether the two runs produced identical results.
    pub is_deterministic: bool,
    /// Tick at which divergence was first detected (if any).
    pub divergence_tick: Option<Ticks>,
    /// Hash log: (tick, hash_run1, hash_run2) for each tick.
    pub hash_log: Vec<(Ticks, u64, u64)>,
}

/// Validate that two engines with the same topology and seed stay in
/// lockstep for `ticks` ticks. Stops at the first divergence.
pub fn validate_determinism(topology: &Topology, seed: u64, ticks: Ticks) -> DeterminismResult {
    let mut engine_a = Engine::new(topology.clone(), seed);
    let mut engine_b = Engine::new(topology.clone(), seed);

    let mut hash_log = Vec::new();
    let mut divergence_tick = None;

    for _ in 0..ticks {
        let report_a = engine_a.step();
        let report_b = engine_b.step();

        let hash_a = engine_a.state_hash();
        let hash_b = engine_b.state_hash();
        let tick = engine_a.tick();
        hash_log.push((tick, hash_a, hash_b));

        if hash_a != hash_b || report_a != report_b {
            log::warn!("engines diverged at tick {tick}");
            divergence_tick = Some(tick);
            break;
        }
    }

    DeterminismResult {
        is_deterministic: divergence_tick.is_none(),
        divergence_tick,
        hash_log,
    }
}
