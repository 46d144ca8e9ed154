//! Error types for the ingestion crate.

use hazard_common::HazardError;
use thiserror::Error;

/// Errors that can occur while reading or writing preprocessing inputs.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Event sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Malformed raster {path}: {reason}")]
    MalformedRaster { path: String, reason: String },

    #[error(transparent)]
    Grid(#[from] HazardError),
}

impl IngestionError {
    /// Create a MalformedRaster error.
    pub fn malformed_raster(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRaster {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<calamine::Error> for IngestionError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err.to_string())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
