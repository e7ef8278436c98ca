//! Error types for esgsense.
//!
//! Row-level parse failures never show up here: they are `Option`s that the
//! cleaner drops. Everything in this enum is a stage-level failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the persistence/export sink, which the pipeline
    /// logs and skips instead of aborting.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Database(_) | Self::Export(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
