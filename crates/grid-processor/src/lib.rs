//! Gridding of point gauge readings onto the reference raster.
//!
//! Rain gauges report at a handful of scattered locations; hazard models
//! want a full raster on the flood grid. This crate spreads gauge values over
//! the grid with power-2 inverse-distance weighting and stamps the no-data
//! mask on the result.
//!
//! # Architecture
//!
//! ```text
//! GridPoints (N cells)   stations (M points)
//!         │                    │
//!         └──────┬─────────────┘
//!                ▼
//!      IdwWeights::new()        once per station set, N x M normalized weights
//!                │
//!   per time step│  values (M readings)
//!                ▼
//!      IdwWeights::apply()      weighted sum per cell (parallel over cells)
//!                │
//!                ├─► masked cells ← nodata
//!                ▼
//!           Raster (nrows x ncols)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::IdwWeights;
//!
//! let weights = IdwWeights::new(grid_points.as_slice(), &stations)?;
//! for readings in time_steps {
//!     let values = weights.apply(&readings, &mask, spec.nodata)?;
//!     let raster = Raster::from_values(values, &spec)?;
//! }
//! ```

pub mod error;
pub mod idw;
pub mod raster;

// Re-export commonly used types at crate root
pub use error::{InterpolationError, Result};
pub use idw::{interpolate, IdwWeights, DISTANCE_EPSILON};
pub use raster::Raster;
