use std::path::PathBuf;

use clematis_core::data_loader::DataLoadError;
use clematis_core::report::SinkError;
use clematis_gen::GeneratorError;

/// Errors that end a command-line run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The config file has an extension we don't support.
    #[error("unsupported config format: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The config file could not be deserialized.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A numeric setting cannot be represented as a fixed-point quantity.
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("network generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// A JSON topology file could not be loaded.
    #[error("topology load error in {file}: {source}")]
    TopologyLoad {
        file: PathBuf,
        source: DataLoadError,
    },

    #[error("failed to write tick records: {0}")]
    Sink(#[from] SinkError),

    #[error("failed to export topology: {0}")]
    Export(#[from] serde_json::Error),

    #[error("replay diverged at tick {tick}")]
    Nondeterministic { tick: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
