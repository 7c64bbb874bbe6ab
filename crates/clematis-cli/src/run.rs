//! Drives one configured run: the main simulation with its CSV stream, the
//! optional determinism check and the parallel replicate summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clematis_core::data_loader::topology_to_json;
use clematis_core::engine::Engine;
use clematis_core::fixed::{Fixed128, Ticks, accumulate, fixed128_to_f64};
use clematis_core::replicate::{ReplicateSummary, run_replicates};
use clematis_core::report::CsvSink;
use clematis_core::topology::Topology;
use clematis_core::validation::validate_determinism;

use crate::config::RunConfig;
use crate::error::CliError;

/// Run `ticks` ticks, streaming one CSV record per tick into `out`.
/// Returns the total finished goods.
pub fn simulate<W: Write>(
    topology: Topology,
    seed: u64,
    ticks: Ticks,
    out: W,
) -> Result<Fixed128, CliError> {
    let mut engine = Engine::new(topology, seed);
    let mut sink = CsvSink::new(out);
    let mut total = Fixed128::ZERO;
    for _ in 0..ticks {
        total = accumulate(total, engine.step_with_sink(&mut sink)?.total_production);
    }
    sink.flush()?;
    Ok(total)
}

/// Seeds for the replicate summary: the `count` seeds following `seed`.
pub fn replicate_seeds(seed: u64, count: u32) -> Vec<u64> {
    (1..=u64::from(count)).map(|i| seed.wrapping_add(i)).collect()
}

/// Mean throughput over all replicates, or 0 when there are none.
pub fn mean_throughput(summaries: &[ReplicateSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().map(ReplicateSummary::throughput).sum::<f64>() / summaries.len() as f64
}

pub fn export_topology(topology: &Topology, path: &Path) -> Result<(), CliError> {
    std::fs::write(path, topology_to_json(topology)?)?;
    log::info!("topology written to {}", path.display());
    Ok(())
}

/// Execute a full run from a loaded config.
pub fn execute(config: &RunConfig, verify: bool, export: Option<&Path>) -> Result<(), CliError> {
    let topology = config.network.build(config.seed)?;
    if let Some(path) = export {
        export_topology(&topology, path)?;
    }

    if verify {
        let result = validate_determinism(&topology, config.seed, config.ticks);
        if let Some(tick) = result.divergence_tick {
            return Err(CliError::Nondeterministic { tick });
        }
        log::info!("determinism check passed over {} ticks", config.ticks);
    }

    let total = match &config.output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            let total = simulate(topology.clone(), config.seed, config.ticks, file)?;
            log::info!("tick records written to {}", path.display());
            total
        }
        None => {
            let stdout = std::io::stdout();
            simulate(topology.clone(), config.seed, config.ticks, stdout.lock())?
        }
    };
    log::info!(
        "seed {}: {} finished goods over {} ticks",
        config.seed,
        fixed128_to_f64(total),
        config.ticks
    );

    if config.replicates > 0 {
        let seeds = replicate_seeds(config.seed, config.replicates);
        let summaries = run_replicates(&topology, &seeds, config.ticks);
        for summary in &summaries {
            log::debug!(
                "replicate seed {}: throughput {:.4}, starved {:.2}, blocked {:.2}, working {:.2}",
                summary.seed,
                summary.throughput(),
                summary.mean_starved,
                summary.mean_blocked,
                summary.mean_working
            );
        }
        log::info!(
            "{} replicates: mean throughput {:.4}",
            summaries.len(),
            mean_throughput(&summaries)
        );
    }

    Ok(())
}
