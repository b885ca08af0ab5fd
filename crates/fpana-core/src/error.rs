use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing input file: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Invalid table file {}: {reason}", path.display())]
    InvalidTable { path: PathBuf, reason: String },

    #[error("Malformed row {row} in {}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("FITS error in {}: {reason}", path.display())]
    Fits { path: PathBuf, reason: String },

    #[error("Column '{name}': {reason}")]
    Column { name: String, reason: String },

    #[error("Table in {} has no rows", path.display())]
    EmptyTable { path: PathBuf },

    #[error("Failed to write output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage [{stage}] cannot {action} while {state}")]
    Lifecycle {
        stage: String,
        action: &'static str,
        state: String,
    },

    #[error("Band index {band} out of range (bands: {bands})")]
    BandOutOfRange { band: usize, bands: usize },

    #[error("Invalid filter symbol {0:?}")]
    UnknownFilter(String),

    #[error("Invalid camcol {0} (expected 1..=6)")]
    InvalidCamCol(u8),

    #[error("Collector stopped receiving records")]
    CollectorDisconnected,

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl FpError {
    /// Wrap an I/O error raised while producing an output artifact.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn column(name: &str, reason: impl Into<String>) -> Self {
        Self::Column {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FpError>;
