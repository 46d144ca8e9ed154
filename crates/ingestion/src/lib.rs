//! Input readers and writers for storm hazard preprocessing.
//!
//! Everything that touches a file format lives here:
//!
//! - ESRI ASCII flood grids and their metadata header ([`ascii_grid`])
//! - Dense comma-delimited rasters, read for the mask and written for every
//!   rain step ([`raster_io`])
//! - Rain gauge coordinates from the built-in table and the CWA catalog
//!   ([`stations`])
//! - The hourly rain workbook, one sheet per event ([`workbook`])

pub mod ascii_grid;
pub mod error;
pub mod raster_io;
pub mod stations;
pub mod workbook;

// Re-exports
pub use ascii_grid::{convert_to_csv, extract_metadata, flood_rasters, HEADER_LINES, METADATA_FILE};
pub use error::{IngestionError, Result};
pub use raster_io::{read_csv_raster, write_csv_raster};
pub use stations::{base_label, builtin_stations, StationCatalog, StationResolver};
pub use workbook::{
    table_from_range, EventSource, EventTable, MemoryEventSource, WorkbookLayout, WorkbookSource,
};
