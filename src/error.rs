use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mot2yolo operations.
///
/// Only configuration problems abort a run. Sequence-, row- and file-level
/// failures are recorded in the [`RunReport`](crate::conversion::RunReport)
/// instead of being returned.
#[derive(Debug, Error)]
pub enum Mot2YoloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read ground truth {}: {source}", path.display())]
    GroundTruthRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}
