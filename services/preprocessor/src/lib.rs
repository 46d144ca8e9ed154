//! Storm hazard input preprocessing.
//!
//! Two stages share one output tree:
//!
//! 1. [`floods`] converts raw ESRI ASCII flood rasters into comma-delimited
//!    tables under `<output>/<target_id>/flood/`.
//! 2. [`rain`] takes the reference event's flood grid as geometry and mask,
//!    then grids every event's hourly gauge readings with IDW into
//!    `<output>/<target_id>/rain/`.

pub mod config;
pub mod floods;
pub mod output;
pub mod rain;

pub use config::{PathsConfig, PreprocessConfig, ReferenceConfig};
pub use floods::{convert_floods, FloodSummary};
pub use output::{raster_file_name, CsvRasterSink, RasterSink};
pub use rain::{
    EventSummary, RainGridder, RunSummary, SkipReason, SkippedEvent, StationSelection,
    PROGRESS_INTERVAL,
};
