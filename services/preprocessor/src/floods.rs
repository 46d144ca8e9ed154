//! Flood raster conversion.
//!
//! Each raw flood folder holds one event's depth rasters as ESRI ASCII
//! grids. They are converted to header-less comma-delimited tables under
//! `<output>/<target_id>/flood/`, together with a copy of the grid header.

use std::fs;

use anyhow::{bail, Context, Result};
use ingestion::{convert_to_csv, extract_metadata, flood_rasters};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PreprocessConfig;

/// Outcome of converting one event folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloodSummary {
    pub target_id: String,
    pub source_folder: String,
    pub files_found: usize,
    pub converted: usize,
    pub failed: usize,
    pub metadata_written: bool,
}

/// Convert every configured flood folder.
///
/// A missing raw flood root is fatal. Missing or empty event folders are
/// skipped; individual file failures are logged and counted.
pub fn convert_floods(config: &PreprocessConfig) -> Result<Vec<FloodSummary>> {
    let raw_root = &config.paths.raw_flood_dir;
    if !raw_root.is_dir() {
        bail!("Raw flood directory does not exist: {}", raw_root.display());
    }

    info!(
        source = %raw_root.display(),
        target = %config.paths.output_dir.display(),
        "Starting flood data processing"
    );

    let mut summaries = Vec::new();
    for (folder, target_id) in &config.flood_folders {
        let source_dir = raw_root.join(folder);
        if !source_dir.is_dir() {
            info!(target_id = %target_id, folder = %folder, "Source folder not found, skipping");
            continue;
        }

        let target_dir = config.flood_dir(target_id);
        fs::create_dir_all(&target_dir)
            .with_context(|| format!("Failed to create {}", target_dir.display()))?;

        let files = flood_rasters(&source_dir)
            .with_context(|| format!("Failed to list {}", source_dir.display()))?;
        if files.is_empty() {
            warn!(target_id = %target_id, dir = %source_dir.display(), "No flood rasters found");
            continue;
        }

        info!(
            target_id = %target_id,
            event = config.event_name(target_id).unwrap_or("Unknown"),
            files = files.len(),
            "Processing flood rasters"
        );

        let metadata_written = match extract_metadata(&files[0], &target_dir) {
            Ok(true) => true,
            Ok(false) => {
                warn!(
                    file = %files[0].display(),
                    "Fewer than six header lines, metadata not extracted"
                );
                false
            }
            Err(e) => {
                warn!(file = %files[0].display(), error = %e, "Failed to extract metadata");
                false
            }
        };

        let mut converted = 0;
        let mut failed = 0;
        for file in &files {
            match convert_to_csv(file, &target_dir) {
                Ok(_) => converted += 1,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Failed to convert flood raster");
                    failed += 1;
                }
            }
        }

        info!(target_id = %target_id, converted, failed, "Completed flood folder");

        summaries.push(FloodSummary {
            target_id: target_id.clone(),
            source_folder: folder.clone(),
            files_found: files.len(),
            converted,
            failed,
            metadata_written,
        });
    }

    Ok(summaries)
}
