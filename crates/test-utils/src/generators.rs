//! Test data generators for creating synthetic raster data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a flood-depth-like raster whose outer ring of cells is no-data.
///
/// Interior cells hold small positive depths (`0.01 * (row + col)`), the
/// border mimics the area outside a watershed boundary.
pub fn create_basin_raster(ncols: usize, nrows: usize, nodata: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(ncols * nrows);
    for row in 0..nrows {
        for col in 0..ncols {
            let border = row == 0 || col == 0 || row + 1 == nrows || col + 1 == ncols;
            if border {
                data.push(nodata);
            } else {
                data.push(0.01 * (row + col) as f64);
            }
        }
    }
    data
}

/// Number of cells [`create_basin_raster`] marks as no-data.
pub fn basin_border_cells(ncols: usize, nrows: usize) -> usize {
    if ncols < 3 || nrows < 3 {
        return ncols * nrows;
    }
    ncols * nrows - (ncols - 2) * (nrows - 2)
}

/// Six-line ESRI ASCII grid header.
pub fn esri_header(
    ncols: usize,
    nrows: usize,
    xllcorner: f64,
    yllcorner: f64,
    cellsize: f64,
    nodata: f64,
) -> String {
    format!(
        "ncols         {}\nnrows         {}\nxllcorner     {}\nyllcorner     {}\ncellsize      {}\nNODATA_value  {}\n",
        ncols, nrows, xllcorner, yllcorner, cellsize, nodata
    )
}

/// Format a full ESRI ASCII grid: header followed by space separated rows.
pub fn format_ascii_grid(header: &str, data: &[f64], ncols: usize) -> String {
    let mut text = String::from(header);
    for row in data.chunks(ncols) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push(' ');
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}

/// Format a dense comma-delimited raster without header.
pub fn format_csv_raster(data: &[f64], ncols: usize) -> String {
    let mut text = String::new();
    for row in data.chunks(ncols) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push_str(&line.join(","));
        text.push('\n');
    }
    text
}
