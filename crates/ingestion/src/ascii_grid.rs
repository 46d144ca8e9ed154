//! ESRI ASCII grid (`.asc`) flood rasters.
//!
//! A file starts with [`HEADER_LINES`] `key value` lines (`ncols`, `nrows`,
//! `xllcorner`, `yllcorner`, `cellsize`, `NODATA_value`) followed by one
//! whitespace-separated line per grid row, north row first.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IngestionError, Result};

/// Number of header lines preceding the raster body.
pub const HEADER_LINES: usize = 6;

/// Name of the metadata file written next to converted rasters.
pub const METADATA_FILE: &str = "metadata.txt";

/// Name of the per-event maximum depth raster.
pub const MAX_DEPTH_FILE: &str = "dm1maxd0.asc";

/// Collect the flood rasters of one raw event folder.
///
/// Returns the `dm1d*.asc` time-step rasters sorted by file name, followed by
/// [`MAX_DEPTH_FILE`] when present. Subdirectories are not searched.
pub fn flood_rasters(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut steps = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with("dm1d") && name.ends_with(".asc") {
            steps.push(entry.into_path());
        }
    }

    let max_depth = dir.join(MAX_DEPTH_FILE);
    if max_depth.is_file() {
        steps.push(max_depth);
    }

    debug!(dir = %dir.display(), count = steps.len(), "Collected flood rasters");
    Ok(steps)
}

/// Copy the first [`HEADER_LINES`] lines of `source` verbatim into
/// `<target_dir>/metadata.txt`.
///
/// Returns `Ok(false)` without writing anything when the source has fewer
/// header lines than expected.
pub fn extract_metadata(source: &Path, target_dir: &Path) -> Result<bool> {
    let text = fs::read_to_string(source)?;
    let header: Vec<&str> = text.split_inclusive('\n').take(HEADER_LINES).collect();
    if header.len() < HEADER_LINES {
        return Ok(false);
    }

    fs::write(target_dir.join(METADATA_FILE), header.concat())?;
    Ok(true)
}

/// Convert one ASCII grid into a comma-delimited table without header.
///
/// The output keeps the source's base name with a `.csv` extension and is
/// written into `target_dir`, replacing any previous file. Blank body lines
/// are skipped; rows of unequal width are rejected.
pub fn convert_to_csv(source: &Path, target_dir: &Path) -> Result<PathBuf> {
    let stem = source.file_stem().ok_or_else(|| {
        IngestionError::malformed_raster(source.display().to_string(), "no file name")
    })?;
    let target = target_dir.join(stem).with_extension("csv");

    let text = fs::read_to_string(source)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&target)?;

    let mut width: Option<usize> = None;
    let mut rows = 0usize;
    for (index, line) in text.lines().enumerate().skip(HEADER_LINES) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        match width {
            None => width = Some(tokens.len()),
            Some(expected) if expected != tokens.len() => {
                return Err(IngestionError::malformed_raster(
                    source.display().to_string(),
                    format!(
                        "line {} has {} values, expected {}",
                        index + 1,
                        tokens.len(),
                        expected
                    ),
                ));
            }
            Some(_) => {}
        }
        writer.write_record(&tokens)?;
        rows += 1;
    }
    writer.flush()?;

    debug!(
        source = %source.display(),
        target = %target.display(),
        rows = rows,
        cols = width.unwrap_or(0),
        "Converted ASCII grid"
    );
    Ok(target)
}
