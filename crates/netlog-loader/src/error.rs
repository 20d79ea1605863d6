use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a whole source could not contribute to the aggregation.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("can't open {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed qlog document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized log format")]
    UnrecognizedFormat,
}

/// Why a single packet log row was skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing column {column}")]
    MissingColumn { column: usize },

    #[error("column {column}: invalid number '{value}'")]
    InvalidNumber { column: usize, value: String },
}
