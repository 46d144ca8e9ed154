//! Rain raster persistence.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use grid_processor::Raster;
use ingestion::write_csv_raster;

/// Destination for gridded rain rasters.
pub trait RasterSink {
    /// Persist the raster for one event time step.
    fn write(
        &mut self,
        target_id: &str,
        event_name: &str,
        step: usize,
        raster: &Raster,
    ) -> ingestion::Result<()>;
}

/// File name of one step's raster: `<event>_<step:04>.csv`.
pub fn raster_file_name(event_name: &str, step: usize) -> String {
    format!("{}_{:04}.csv", event_name, step)
}

/// Writes rasters to `<output>/<target_id>/rain/<event>_<step>.csv`.
#[derive(Debug)]
pub struct CsvRasterSink {
    output_dir: PathBuf,
    created: HashSet<PathBuf>,
    written: usize,
}

impl CsvRasterSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            created: HashSet::new(),
            written: 0,
        }
    }

    /// Number of rasters written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn rain_dir(&mut self, target_id: &str) -> ingestion::Result<PathBuf> {
        let dir = self.output_dir.join(target_id).join("rain");
        if !self.created.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created.insert(dir.clone());
        }
        Ok(dir)
    }
}

impl RasterSink for CsvRasterSink {
    fn write(
        &mut self,
        target_id: &str,
        event_name: &str,
        step: usize,
        raster: &Raster,
    ) -> ingestion::Result<()> {
        let dir = self.rain_dir(target_id)?;
        write_csv_raster(&dir.join(raster_file_name(event_name, step)), raster)?;
        self.written += 1;
        Ok(())
    }
}
