//! Error types for grid geometry and mask construction.

use thiserror::Error;

/// Result type alias using HazardError.
pub type HazardResult<T> = Result<T, HazardError>;

/// Errors raised while establishing the reference grid.
///
/// All of these are fatal for a run: without a valid geometry and a mask of
/// the right shape no raster can be placed on the grid.
#[derive(Debug, Error)]
pub enum HazardError {
    #[error("Malformed grid metadata: {0}")]
    MalformedMetadata(String),

    #[error("Raster shape mismatch: expected {expected} cells, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Grid rows are not ordered north to south: {0}")]
    RowOrdering(String),
}

impl HazardError {
    /// Create a MalformedMetadata error.
    pub fn malformed_metadata(msg: impl Into<String>) -> Self {
        Self::MalformedMetadata(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}
