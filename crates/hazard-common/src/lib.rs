//! Common types shared across the storm hazard preprocessing workspace.
//!
//! Everything here describes the reference grid the flood rasters are laid
//! out on: its geometry ([`GridSpec`]), the planar cell centers
//! ([`GridPoints`]) and which cells carry no data ([`InvalidMask`]).

pub mod bbox;
pub mod error;
pub mod grid;
pub mod point;

pub use bbox::Extent;
pub use error::{HazardError, HazardResult};
pub use grid::{parse_grid_spec, GridPoints, GridSpec, InvalidMask, NODATA_TOLERANCE};
pub use point::{GeoPoint, PlanarPoint};
