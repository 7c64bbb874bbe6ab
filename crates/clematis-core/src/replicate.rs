//! Independent simulation runs over many seeds.
//!
//! Each replicate owns its own engine and random source, so runs share
//! nothing and can be spread across threads with the `parallel` feature.

use crate::engine::Engine;
use crate::fixed::{Fixed128, Ticks, accumulate, fixed128_to_f64};
use crate::report::StateCounts;
use crate::topology::Topology;

/// Aggregate figures for one seed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReplicateSummary {
    pub seed: u64,
    pub ticks: Ticks,
    pub total_production: Fixed128,
    pub mean_starved: f64,
    pub mean_blocked: f64,
    pub mean_working: f64,
}

impl ReplicateSummary {
    /// Finished goods per tick.
    pub fn throughput(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        fixed128_to_f64(self.total_production) / self.ticks as f64
    }
}

/// Run one seed for `ticks` ticks and summarize it.
pub fn run_replicate(topology: &Topology, seed: u64, ticks: Ticks) -> ReplicateSummary {
    let mut engine = Engine::new(topology.clone(), seed);
    let mut total_production = Fixed128::ZERO;
    let mut sums = [0u64; 3];

    for _ in 0..ticks {
        let report = engine.step();
        total_production = accumulate(total_production, report.total_production);
        let StateCounts {
            starved,
            blocked,
            working,
        } = report.counts;
        sums[0] += starved as u64;
        sums[1] += blocked as u64;
        sums[2] += working as u64;
    }

    let mean = |sum: u64| {
        if ticks == 0 {
            0.0
        } else {
            sum as f64 / ticks as f64
        }
    };

    ReplicateSummary {
        seed,
        ticks,
        total_production,
        mean_starved: mean(sums[0]),
        mean_blocked: mean(sums[1]),
        mean_working: mean(sums[2]),
    }
}

/// Run every seed in parallel. Results are returned in seed order.
#[cfg(feature = "parallel")]
pub fn run_replicates(topology: &Topology, seeds: &[u64], ticks: Ticks) -> Vec<ReplicateSummary> {
    use rayon::prelude::*;

    log::info!("running {} replicates of {} ticks", seeds.len(), ticks);
    seeds
        .par_iter()
        .map(|&seed| run_replicate(topology, seed, ticks))
        .collect()
}

/// Sequential fallback when the `parallel` feature is off.
#[cfg(not(feature = "parallel"))]
pub fn run_replicates(topology: &Topology, seeds: &[u64], ticks: Ticks) -> Vec<ReplicateSummary> {
    seeds
        .iter()
        .map(|&seed| run_replicate(topology, seed, ticks))
        .collect()
}
