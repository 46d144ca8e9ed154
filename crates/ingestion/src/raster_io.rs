//! Dense comma-delimited rasters without header or index column.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use grid_processor::Raster;

use crate::error::{IngestionError, Result};

/// Read a comma-delimited raster from a file into a flat row-major vector.
pub fn read_csv_raster(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    read_csv_raster_from(file, &path.display().to_string())
}

/// Read a comma-delimited raster from any reader.
///
/// Empty fields read as NaN. Rows must all have the same width.
pub fn read_csv_raster_from<R: Read>(reader: R, source: &str) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            if field.is_empty() {
                values.push(f64::NAN);
                continue;
            }
            let value = field.parse::<f64>().map_err(|_| {
                IngestionError::malformed_raster(
                    source,
                    format!("row {} col {}: '{}' is not numeric", row + 1, col + 1, field),
                )
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Write a raster as `nrows` lines of `ncols` comma-separated values.
pub fn write_csv_raster(path: &Path, raster: &Raster) -> Result<()> {
    let file = File::create(path)?;
    write_csv_raster_to(file, raster)
}

/// Write a raster to any writer.
pub fn write_csv_raster_to<W: Write>(writer: W, raster: &Raster) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let mut fields: Vec<String> = Vec::with_capacity(raster.ncols());
    for row in raster.rows() {
        fields.clear();
        fields.extend(row.iter().map(|v| format_value(*v)));
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render a cell value.
///
/// Whole numbers keep one decimal (`30.0`, `-9999.0`) so every field reads
/// back as a float; NaN is written as an empty field.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
