//! Run configuration: format detection, deserialization and conversion of the
//! network section into a topology.
//!
//! A TOML config looks like:
//!
//! ```toml
//! seed = 42
//! ticks = 1000
//! output = "run.csv"
//! replicates = 8
//!
//! [network]
//! kind = "steps"
//! node_count = 30
//! step_count = 5
//! production_level = "decrescent"
//! ```

use std::path::{Path, PathBuf};

use clematis_core::data_loader::load_topology_json;
use clematis_core::fixed::{Fixed64, Ticks, try_f64_to_fixed64};
use clematis_core::topology::Topology;
use clematis_gen::{ProductionLevel, SerialityGenerator, StepGenerator};
use serde::Deserialize;

use crate::error::CliError;

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
}

/// Detect the format of a config file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, CliError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        _ => Err(CliError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Config data
// ===========================================================================

fn default_seed() -> u64 {
    1
}

fn default_ticks() -> Ticks {
    1000
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_one() -> f64 {
    1.0
}

fn default_delta() -> f64 {
    0.1
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: Ticks,
    /// CSV destination. Records go to stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Extra seeds run in parallel for the summary.
    #[serde(default)]
    pub replicates: u32,
    pub network: NetworkConfig,
}

/// How the production network is obtained.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkConfig {
    Seriality {
        node_count: u32,
        seriality: f64,
        #[serde(default = "default_failure_rate")]
        failure_rate: f64,
        #[serde(default = "default_one")]
        buffer_capacity: f64,
    },
    Steps {
        node_count: u32,
        step_count: u32,
        #[serde(default)]
        first_step_machines: Option<u32>,
        #[serde(default)]
        last_step_machines: Option<u32>,
        #[serde(default = "default_failure_rate")]
        failure_rate: f64,
        #[serde(default = "default_one")]
        buffer_capacity: f64,
        #[serde(default = "default_one")]
        production_rate: f64,
        #[serde(default)]
        production_level: LevelConfig,
        /// Only used by the decrescent level.
        #[serde(default = "default_delta")]
        production_delta: f64,
    },
    /// A JSON topology document.
    File { path: PathBuf },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelConfig {
    #[default]
    Constant,
    Uniform,
    Decrescent,
}

fn to_fixed(field: &'static str, value: f64) -> Result<Fixed64, CliError> {
    try_f64_to_fixed64(value).ok_or(CliError::InvalidValue { field, value })
}

impl RunConfig {
    /// Read and parse a config file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let format = detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format, path)
    }

    /// Parse config text. `path` is only used in error messages.
    pub fn parse(content: &str, format: Format, path: &Path) -> Result<Self, CliError> {
        let parse_error = |detail: String| CliError::Parse {
            file: path.to_path_buf(),
            detail,
        };
        match format {
            Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
            Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }
}

impl NetworkConfig {
    /// Generate or load the topology. Generators are seeded with `seed`.
    pub fn build(&self, seed: u64) -> Result<Topology, CliError> {
        match self {
            Self::Seriality {
                node_count,
                seriality,
                failure_rate,
                buffer_capacity,
            } => {
                let generator = SerialityGenerator {
                    node_count: *node_count,
                    seriality: *seriality,
                    failure_rate: to_fixed("failure_rate", *failure_rate)?,
                    buffer_capacity: to_fixed("buffer_capacity", *buffer_capacity)?,
                };
                Ok(generator.generate(seed)?.topology)
            }
            Self::Steps {
                node_count,
                step_count,
                first_step_machines,
                last_step_machines,
                failure_rate,
                buffer_capacity,
                production_rate,
                production_level,
                production_delta,
            } => {
                let production_level = match production_level {
                    LevelConfig::Constant => ProductionLevel::Constant,
                    LevelConfig::Uniform => ProductionLevel::Uniform,
                    LevelConfig::Decrescent => ProductionLevel::Decrescent {
                        delta: to_fixed("production_delta", *production_delta)?,
                    },
                };
                let generator = StepGenerator {
                    node_count: *node_count,
                    step_count: *step_count,
                    first_step_machines: *first_step_machines,
                    last_step_machines: *last_step_machines,
                    failure_rate: to_fixed("failure_rate", *failure_rate)?,
                    buffer_capacity: to_fixed("buffer_capacity", *buffer_capacity)?,
                    production_rate: to_fixed("production_rate", *production_rate)?,
                    production_level,
                };
                Ok(generator.generate(seed)?.topology)
            }
            Self::File { path } => {
                let content = std::fs::read_to_string(path)?;
                load_topology_json(&content).map_err(|source| CliError::TopologyLoad {
                    file: path.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_toml(content: &str) -> Result<RunConfig, CliError> {
        RunConfig::parse(content, Format::Toml, Path::new("test.toml"))
    }

    #[test]
    fn detect_known_formats() {
        assert_eq!(detect_format(Path::new("run.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("run.ron")).unwrap(), Format::Ron);
        assert!(matches!(
            detect_format(Path::new("run.yaml")),
            Err(CliError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn seriality_config_with_defaults() {
        let config = parse_toml(
            r#"
            [network]
            kind = "seriality"
            node_count = 10
            seriality = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 1);
        assert_eq!(config.ticks, 1000);
        assert_eq!(config.output, None);
        assert_eq!(config.replicates, 0);
        assert_eq!(
            config.network,
            NetworkConfig::Seriality {
                node_count: 10,
                seriality: 0.5,
                failure_rate: 0.1,
                buffer_capacity: 1.0,
            }
        );
        let topology = config.network.build(config.seed).unwrap();
        assert_eq!(topology.node_count(), 10);
        assert_eq!(topology.step_count(), 5);
    }

    #[test]
    fn steps_config_builds_generator_network() {
        let config = parse_toml(
            r#"
            seed = 7
            ticks = 50
            output = "out.csv"
            replicates = 4

            [network]
            kind = "steps"
            node_count = 12
            step_count = 4
            first_step_machines = 3
            last_step_machines = 2
            production_level = "decrescent"
            production_delta = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.ticks, 50);
        assert_eq!(config.output, Some(PathBuf::from("out.csv")));
        assert_eq!(config.replicates, 4);
        let NetworkConfig::Steps {
            production_level, ..
        } = &config.network
        else {
            panic!("expected a steps network");
        };
        assert_eq!(*production_level, LevelConfig::Decrescent);

        let topology = config.network.build(config.seed).unwrap();
        assert_eq!(topology.node_count(), 12);
        assert_eq!(topology.step_count(), 4);
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = parse_toml(
            r#"
            [network]
            kind = "random"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
    }

    #[test]
    fn generator_errors_propagate() {
        let network = NetworkConfig::Seriality {
            node_count: 5,
            seriality: 2.0,
            failure_rate: 0.1,
            buffer_capacity: 1.0,
        };
        assert!(matches!(network.build(1), Err(CliError::Generator(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let network = NetworkConfig::Seriality {
            node_count: 5,
            seriality: 0.5,
            failure_rate: f64::INFINITY,
            buffer_capacity: 1.0,
        };
        assert!(matches!(
            network.build(1),
            Err(CliError::InvalidValue {
                field: "failure_rate",
                ..
            })
        ));
    }

    #[test]
    fn missing_topology_file_is_io_error() {
        let network = NetworkConfig::File {
            path: PathBuf::from("/nonexistent/clematis/topology.json"),
        };
        assert!(matches!(network.build(1), Err(CliError::Io(_))));
    }
}
