//! Reference grid geometry, cell centers and no-data masks.
//!
//! The grid follows the ESRI ASCII raster convention: `xllcorner`/`yllcorner`
//! name the lower-left corner of the lower-left cell, and raster bodies are
//! stored row-major with the **northernmost** row first. [`GridPoints`] and
//! [`InvalidMask`] share that layout so index `i` always refers to the same
//! cell in both.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Extent, HazardError, HazardResult, PlanarPoint};

/// Absolute tolerance used when comparing raster values to the no-data sentinel.
///
/// Reference rasters pass through a text round trip before they are read
/// back, so the sentinel is not guaranteed to be bit-exact.
pub const NODATA_TOLERANCE: f64 = 1e-3;

/// Largest `ncols` or `nrows` accepted from a header.
pub const MAX_DIMENSION: usize = u32::MAX as usize;

const REQUIRED_KEYS: [&str; 6] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "cellsize",
    "NODATA_value",
];

/// Geometry of a regular square-cell raster in planar coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub ncols: usize,
    pub nrows: usize,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    pub nodata: f64,
}

impl GridSpec {
    /// Parse a header block such as the contents of `metadata.txt`.
    pub fn from_header_text(text: &str) -> HazardResult<Self> {
        parse_grid_spec(text.lines())
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.ncols * self.nrows
    }

    /// Check if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Planar extent covered by the grid, outer cell edges included.
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.xllcorner,
            self.yllcorner,
            self.xllcorner + self.ncols as f64 * self.cellsize,
            self.yllcorner + self.nrows as f64 * self.cellsize,
        )
    }

    /// Render the six-line ESRI header for this grid.
    pub fn to_header(&self) -> String {
        format!(
            "ncols         {}\nnrows         {}\nxllcorner     {}\nyllcorner     {}\ncellsize      {}\nNODATA_value  {}\n",
            self.ncols, self.nrows, self.xllcorner, self.yllcorner, self.cellsize, self.nodata
        )
    }
}

/// Parse `key value` lines into a [`GridSpec`].
///
/// Blank lines and lines with a single token are ignored, unknown keys are
/// ignored and a repeated key keeps its last value. Keys are case-sensitive.
pub fn parse_grid_spec<I, S>(lines: I) -> HazardResult<GridSpec>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut values: HashMap<String, String> = HashMap::new();
    for line in lines {
        let mut parts = line.as_ref().split_whitespace();
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            values.insert(key.to_string(), value.to_string());
        }
    }

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !values.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(HazardError::malformed_metadata(format!(
            "missing keys: {}",
            missing.join(", ")
        )));
    }

    let number = |key: &str| -> HazardResult<f64> {
        let raw = &values[key];
        raw.parse::<f64>().map_err(|_| {
            HazardError::malformed_metadata(format!("{} is not numeric: '{}'", key, raw))
        })
    };
    let count = |key: &str| -> HazardResult<usize> {
        let value = number(key)?;
        if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
            return Err(HazardError::malformed_metadata(format!(
                "{} must be a positive integer, got {}",
                key, value
            )));
        }
        if value > MAX_DIMENSION as f64 {
            return Err(HazardError::malformed_metadata(format!(
                "{} exceeds {}, got {}",
                key, MAX_DIMENSION, value
            )));
        }
        Ok(value as usize)
    };

    let spec = GridSpec {
        ncols: count("ncols")?,
        nrows: count("nrows")?,
        xllcorner: number("xllcorner")?,
        yllcorner: number("yllcorner")?,
        cellsize: number("cellsize")?,
        nodata: number("NODATA_value")?,
    };

    if spec.ncols.checked_mul(spec.nrows).is_none() {
        return Err(HazardError::malformed_metadata(format!(
            "{} x {} cells overflow the addressable size",
            spec.ncols, spec.nrows
        )));
    }

    if spec.cellsize <= 0.0 || !spec.cellsize.is_finite() {
        return Err(HazardError::malformed_metadata(format!(
            "cellsize must be positive, got {}",
            spec.cellsize
        )));
    }

    Ok(spec)
}

/// Cell-center coordinates of every grid cell, north row first.
#[derive(Debug, Clone)]
pub struct GridPoints {
    points: Vec<PlanarPoint>,
    ncols: usize,
}

impl GridPoints {
    /// Compute the cell centers for a grid.
    ///
    /// Fails with [`HazardError::RowOrdering`] if floating point rounding at
    /// this grid's scale would break the strictly decreasing row Y sequence
    /// (or strictly increasing column X sequence) that mask and rasters rely on.
    pub fn new(spec: &GridSpec) -> HazardResult<Self> {
        let half = spec.cellsize / 2.0;
        let xs: Vec<f64> = (0..spec.ncols)
            .map(|col| spec.xllcorner + col as f64 * spec.cellsize + half)
            .collect();
        let ys: Vec<f64> = (0..spec.nrows)
            .map(|row| spec.yllcorner + (spec.nrows - row) as f64 * spec.cellsize - half)
            .collect();

        if let Some(pair) = ys.windows(2).find(|pair| pair[1] >= pair[0]) {
            return Err(HazardError::RowOrdering(format!(
                "row center {} does not lie south of {}",
                pair[1], pair[0]
            )));
        }
        if let Some(pair) = xs.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(HazardError::RowOrdering(format!(
                "column center {} does not lie east of {}",
                pair[1], pair[0]
            )));
        }

        let mut points = Vec::with_capacity(spec.len());
        for &y in &ys {
            for &x in &xs {
                points.push(PlanarPoint::new(x, y));
            }
        }

        Ok(Self {
            points,
            ncols: spec.ncols,
        })
    }

    /// All points in row-major order.
    pub fn as_slice(&self) -> &[PlanarPoint] {
        &self.points
    }

    /// Point at a row/column position.
    pub fn get(&self, row: usize, col: usize) -> Option<&PlanarPoint> {
        if col >= self.ncols {
            return None;
        }
        self.points.get(row * self.ncols + col)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-cell flags marking cells that carry the no-data sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMask {
    cells: Vec<bool>,
}

impl InvalidMask {
    /// Build the mask from a reference raster laid out like [`GridPoints`].
    ///
    /// A cell is invalid when `|value - nodata| <= NODATA_TOLERANCE`. NaN
    /// cells are not considered invalid.
    pub fn from_raster(raster: &[f64], spec: &GridSpec) -> HazardResult<Self> {
        if raster.len() != spec.len() {
            return Err(HazardError::shape_mismatch(spec.len(), raster.len()));
        }

        let cells = raster
            .iter()
            .map(|value| (value - spec.nodata).abs() <= NODATA_TOLERANCE)
            .collect();

        Ok(Self { cells })
    }

    /// A mask with every cell valid.
    pub fn all_valid(spec: &GridSpec) -> Self {
        Self {
            cells: vec![false; spec.len()],
        }
    }

    /// Build a mask directly from flags.
    pub fn from_flags(cells: Vec<bool>) -> Self {
        Self { cells }
    }

    /// Check whether the cell at a flat index is invalid.
    pub fn is_invalid(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Number of invalid cells.
    pub fn invalid_count(&self) -> usize {
        self.cells.iter().filter(|flag| **flag).count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
