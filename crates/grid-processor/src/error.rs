//! Error types for gridding.

use thiserror::Error;

/// Errors that can occur while interpolating gauge values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InterpolationError {
    /// No station is available to interpolate from.
    #[error("no stations in scope")]
    NoStationsInScope,

    /// The value vector does not line up with the station set.
    #[error("expected {expected} station values, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    /// A grid-shaped input does not have the grid's cell count.
    #[error("expected {expected} grid cells, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl InterpolationError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}

/// Result type for gridding operations.
pub type Result<T> = std::result::Result<T, InterpolationError>;
