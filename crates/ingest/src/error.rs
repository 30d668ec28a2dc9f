use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Input must be a market map or an object with a `providers` list, found {0}")]
    TypeMismatch(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV row {row}: column '{column}' is not a number: '{value}'")]
    InvalidCsvValue {
        row: usize,
        column: String,
        value: String,
    },
}
