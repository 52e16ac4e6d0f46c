use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur in kindlediff-core.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid metadata cache XML: {0}")]
    Xml(String),

    #[error("snapshot {file} is missing the '{missing}' column")]
    SnapshotSchema { file: PathBuf, missing: String },

    #[error("failed to read snapshot {file}: {source}")]
    SnapshotLoad {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
