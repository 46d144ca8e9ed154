//! Inverse-distance weighting with power 2.
//!
//! For grid cell `g` and station `s` the raw weight is
//! `1 / max(d²(g, s), DISTANCE_EPSILON)`. The clamp keeps a station sitting
//! exactly on a cell center finite; such a station then dominates that cell.
//! Weights are normalized per cell once, so each time step costs one dot
//! product per cell.

use hazard_common::{GridPoints, GridSpec, InvalidMask, PlanarPoint};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{InterpolationError, Result};

/// Lower bound on squared distance, in squared planar units.
pub const DISTANCE_EPSILON: f64 = 1e-6;

/// Normalized IDW weights for a fixed set of cells and stations.
///
/// Stored row-major by cell: the weights of cell `i` occupy
/// `weights[i * stations .. (i + 1) * stations]` and sum to one.
#[derive(Debug, Clone)]
pub struct IdwWeights {
    weights: Vec<f64>,
    cells: usize,
    stations: usize,
}

impl IdwWeights {
    /// Compute weights for every (cell, station) pair.
    pub fn new(grid: &[PlanarPoint], stations: &[PlanarPoint]) -> Result<Self> {
        if stations.is_empty() {
            return Err(InterpolationError::NoStationsInScope);
        }

        let m = stations.len();
        let mut weights = vec![0.0; grid.len() * m];

        weights
            .par_chunks_mut(m)
            .zip(grid.par_iter())
            .for_each(|(row, cell)| {
                let mut total = 0.0;
                for (w, station) in row.iter_mut().zip(stations) {
                    *w = 1.0 / cell.dist_sq(station).max(DISTANCE_EPSILON);
                    total += *w;
                }
                for w in row.iter_mut() {
                    *w /= total;
                }
            });

        debug!(cells = grid.len(), stations = m, "Computed IDW weights");

        Ok(Self {
            weights,
            cells: grid.len(),
            stations: m,
        })
    }

    /// Number of grid cells.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Number of stations.
    pub fn stations(&self) -> usize {
        self.stations
    }

    /// Normalized weights of one cell, in station order.
    pub fn cell_weights(&self, cell: usize) -> Option<&[f64]> {
        if cell >= self.cells {
            return None;
        }
        Some(&self.weights[cell * self.stations..(cell + 1) * self.stations])
    }

    /// Interpolate one set of station values onto every cell, without masking.
    pub fn apply_unmasked(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.stations {
            return Err(InterpolationError::ValueCountMismatch {
                expected: self.stations,
                actual: values.len(),
            });
        }

        Ok(self
            .weights
            .par_chunks(self.stations)
            .map(|row| row.iter().zip(values).map(|(w, v)| w * v).sum::<f64>())
            .collect())
    }

    /// Interpolate station values and overwrite masked cells with `nodata`.
    ///
    /// Masking happens after every cell has been computed.
    pub fn apply(&self, values: &[f64], mask: &InvalidMask, nodata: f64) -> Result<Vec<f64>> {
        if mask.len() != self.cells {
            return Err(InterpolationError::shape_mismatch(self.cells, mask.len()));
        }

        let mut out = self.apply_unmasked(values)?;
        out.par_iter_mut()
            .zip(mask.as_slice().par_iter())
            .filter(|(_, invalid)| **invalid)
            .for_each(|(value, _)| *value = nodata);

        Ok(out)
    }
}

/// Interpolate one set of station values onto a grid in a single call.
///
/// Convenience wrapper over [`IdwWeights`] for callers that only evaluate a
/// station set once.
pub fn interpolate(
    grid: &GridPoints,
    stations: &[PlanarPoint],
    values: &[f64],
    mask: &InvalidMask,
    spec: &GridSpec,
) -> Result<Vec<f64>> {
    if grid.len() != spec.len() {
        return Err(InterpolationError::shape_mismatch(spec.len(), grid.len()));
    }
    if stations.len() != values.len() {
        return Err(InterpolationError::ValueCountMismatch {
            expected: stations.len(),
            actual: values.len(),
        });
    }

    IdwWeights::new(grid.as_slice(), stations)?.apply(values, mask, spec.nodata)
}
