//! Clematis command-line runner.
//!
//! Loads a run configuration, builds the production network, and streams
//! per-tick station counts as CSV.

mod config;
mod error;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clematis_core::fixed::Ticks;

use config::RunConfig;
use error::CliError;

/// Simulate material flow through a manufacturing network
#[derive(Parser, Debug)]
#[command(name = "clematis")]
#[command(version)]
struct Cli {
    /// Run configuration (.toml or .ron)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured number of ticks
    #[arg(long)]
    ticks: Option<Ticks>,

    /// Override the configured CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replay the run twice and fail if the two runs diverge
    #[arg(long)]
    verify: bool,

    /// Write the network as a JSON topology document
    #[arg(long)]
    export_topology: Option<PathBuf>,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> Result<RunConfig, CliError> {
        let mut config = RunConfig::load(&self.config)?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG is applied after the -v level, so it can narrow or widen it.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = cli
        .load_config()
        .and_then(|config| run::execute(&config, cli.verify, cli.export_topology.as_deref()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
