//! Error handling for the DPV-CQW pipeline.
//!
//! Only resource-level failures are represented here. Field-level parse misses
//! are absorbed into the data model as missing values and never surface as
//! errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid source file: {path} - {reason}")]
    InvalidSource { path: PathBuf, reason: String },

    #[error("Invalid file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a JSON error with the file it came from
    pub fn invalid_source(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
