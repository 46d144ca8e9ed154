//! Error types for projection operations.

use thiserror::Error;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised when a coordinate cannot be transformed.
#[derive(Error, Debug, PartialEq)]
pub enum ProjectionError {
    /// Geographic coordinate outside the projection's valid domain
    #[error("coordinate ({lat}, {lon}) is outside the projection domain")]
    OutOfDomain { lat: f64, lon: f64 },

    /// Non-finite planar coordinate
    #[error("invalid planar coordinate ({x}, {y})")]
    InvalidPlanar { x: f64, y: f64 },
}
