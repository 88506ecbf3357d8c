use thiserror::Error;

use crate::formatter::FormatterError;

pub type SheetwrapResult<T> = Result<T, SheetwrapError>;

#[derive(Error, Debug)]
pub enum SheetwrapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File error: {0}")]
    Ingestion(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversion failed: {0}")]
    Formatter(#[from] FormatterError),

    #[error("Configuration error: {0}")]
    Config(String),
}
