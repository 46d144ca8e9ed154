//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! The run uses a single [`Projection`] instance, built once, to move gauge
//! coordinates onto the flood grid's planar system.

pub mod error;
pub mod transverse_mercator;

pub use error::{ProjectionError, ProjectionResult};
pub use transverse_mercator::TransverseMercator;

use hazard_common::{GeoPoint, PlanarPoint};

/// A geographic ↔ planar coordinate transform.
pub trait Projection: Send + Sync {
    /// Project WGS84 degrees to planar meters.
    fn forward(&self, point: GeoPoint) -> ProjectionResult<PlanarPoint>;

    /// Recover WGS84 degrees from planar meters.
    fn inverse(&self, point: PlanarPoint) -> ProjectionResult<GeoPoint>;
}
