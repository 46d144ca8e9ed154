//! Dense output raster.

use hazard_common::GridSpec;

use crate::error::{InterpolationError, Result};

/// One grid of values in row-major order, north row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: Vec<f64>,
    ncols: usize,
    nrows: usize,
}

impl Raster {
    /// Wrap a flat value vector, checking it matches the grid.
    pub fn from_values(data: Vec<f64>, spec: &GridSpec) -> Result<Self> {
        if data.len() != spec.len() {
            return Err(InterpolationError::shape_mismatch(spec.len(), data.len()));
        }
        Ok(Self {
            data,
            ncols: spec.ncols,
            nrows: spec.nrows,
        })
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the value at a specific grid coordinate.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.ncols || row >= self.nrows {
            return None;
        }
        self.data.get(row * self.ncols + col).copied()
    }

    /// Iterate over rows, north to south.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.ncols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
