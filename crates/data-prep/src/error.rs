//! Custom error types for the data preparation pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. A dataset
//! pipeline aborts on file-level failures (missing or unreadable input);
//! cell-level problems are handled inside the stages and never surface
//! as errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::SpecValidationError;

/// The main error type for the preparation pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Input file does not exist. The dataset is aborted; other datasets
    /// are unaffected.
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    /// Input file exists but could not be parsed as delimited text.
    #[error("failed to parse '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Column was not found in the table.
    #[error("column '{0}' not found in table")]
    ColumnNotFound(String),

    /// The dataset spec failed validation.
    #[error("invalid dataset spec: {0}")]
    InvalidSpec(#[from] SpecValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error (run reports).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// Check if this error means the input file was absent.
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;
