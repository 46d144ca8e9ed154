//! Rain grid generation.
//!
//! The reference event's converted flood output fixes the grid: its header
//! gives the geometry and its first depth raster gives the no-data mask.
//! Every event sheet is then gridded step by step with IDW from the gauges
//! that resolve to a coordinate inside the grid.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use grid_processor::{IdwWeights, Raster};
use hazard_common::{GridPoints, GridSpec, HazardError, InvalidMask, PlanarPoint};
use ingestion::{read_csv_raster, EventSource, EventTable, StationResolver};
use projection::{Projection, TransverseMercator};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PreprocessConfig;
use crate::output::RasterSink;

/// Steps between progress log lines.
pub const PROGRESS_INTERVAL: usize = 24;

/// Why an event produced no rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The sheet name has no target id mapping.
    UnresolvedEventName,
    /// No gauge column resolved to a point inside the grid.
    NoStationsInScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEvent {
    pub event_name: String,
    pub reason: SkipReason,
}

/// One gridded event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub event_name: String,
    pub target_id: String,
    pub stations: Vec<String>,
    pub outside_grid: Vec<String>,
    pub steps: usize,
}

/// Result of a rain run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub processed: Vec<EventSummary>,
    pub skipped: Vec<SkippedEvent>,
    /// Event name -> gauge columns with no known coordinate
    pub unresolved_stations: BTreeMap<String, Vec<String>>,
}

impl RunSummary {
    /// Total rasters written across all events.
    pub fn rasters_written(&self) -> usize {
        self.processed.iter().map(|e| e.steps).sum()
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Gauge columns of one event that take part in gridding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSelection {
    /// Column indices into the event table, in table order
    pub columns: Vec<usize>,
    pub labels: Vec<String>,
    /// Projected positions, parallel to `columns`
    pub points: Vec<PlanarPoint>,
    pub unresolved: Vec<String>,
    pub outside_grid: Vec<String>,
}

impl StationSelection {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Grids rain events onto the reference raster.
pub struct RainGridder {
    spec: GridSpec,
    mask: InvalidMask,
    points: GridPoints,
    resolver: StationResolver,
    projection: Box<dyn Projection>,
    name_to_id: BTreeMap<String, String>,
}

impl RainGridder {
    /// Build a gridder from an already established grid.
    pub fn new(
        spec: GridSpec,
        mask: InvalidMask,
        resolver: StationResolver,
        projection: Box<dyn Projection>,
        name_to_id: BTreeMap<String, String>,
    ) -> Result<Self> {
        if mask.len() != spec.len() {
            return Err(HazardError::shape_mismatch(spec.len(), mask.len()).into());
        }
        let points = GridPoints::new(&spec)?;

        info!(
            bounds = %spec.extent(),
            cells = spec.len(),
            masked = mask.invalid_count(),
            "Reference grid ready"
        );

        Ok(Self {
            spec,
            mask,
            points,
            resolver,
            projection,
            name_to_id,
        })
    }

    /// Build a gridder from the reference event's converted flood output.
    pub fn from_reference(config: &PreprocessConfig, resolver: StationResolver) -> Result<Self> {
        let dir = config.reference_dir();
        let metadata_path = dir.join(&config.reference.metadata);
        let raster_path = dir.join(&config.reference.raster);

        if !metadata_path.is_file() || !raster_path.is_file() {
            bail!(
                "Reference metadata/mask not found in {}; run the floods step first",
                dir.display()
            );
        }

        let header = fs::read_to_string(&metadata_path)
            .with_context(|| format!("Failed to read {}", metadata_path.display()))?;
        let spec = GridSpec::from_header_text(&header)
            .with_context(|| format!("Invalid grid metadata in {}", metadata_path.display()))?;

        let raster = read_csv_raster(&raster_path)
            .with_context(|| format!("Failed to read mask raster {}", raster_path.display()))?;
        let mask = InvalidMask::from_raster(&raster, &spec)
            .with_context(|| format!("Mask raster {} does not fit the grid", raster_path.display()))?;

        Self::new(
            spec,
            mask,
            resolver,
            Box::new(TransverseMercator::twd97_tm2()),
            config.name_to_id(),
        )
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn mask(&self) -> &InvalidMask {
        &self.mask
    }

    /// Resolve, project and bound-check the gauge columns of one event.
    pub fn select_stations(&self, table: &EventTable) -> StationSelection {
        let extent = self.spec.extent();
        let mut selection = StationSelection::default();

        for (index, label) in table.columns.iter().enumerate() {
            let Some(geo) = self.resolver.resolve_column(label) else {
                selection.unresolved.push(label.clone());
                continue;
            };

            match self.projection.forward(geo) {
                Ok(point) if extent.contains(&point) => {
                    selection.columns.push(index);
                    selection.labels.push(label.clone());
                    selection.points.push(point);
                }
                Ok(point) => {
                    debug!(station = %label, x = point.x, y = point.y, "Station outside grid");
                    selection.outside_grid.push(label.clone());
                }
                Err(e) => {
                    warn!(station = %label, error = %e, "Station could not be projected");
                    selection.outside_grid.push(label.clone());
                }
            }
        }

        selection
    }

    /// Grid every step of one event and hand the rasters to `sink`.
    ///
    /// Returns the number of steps written.
    pub fn grid_event<K>(
        &self,
        target_id: &str,
        table: &EventTable,
        selection: &StationSelection,
        sink: &mut K,
    ) -> Result<usize>
    where
        K: RasterSink + ?Sized,
    {
        let weights = IdwWeights::new(self.points.as_slice(), &selection.points)?;
        let total = table.steps();

        for step in 0..total {
            let values = table.values_at(step, &selection.columns).ok_or_else(|| {
                anyhow!("Step {} of {} is narrower than its header", step, table.name)
            })?;
            let cells = weights.apply(&values, &self.mask, self.spec.nodata)?;
            let raster = Raster::from_values(cells, &self.spec)?;
            sink.write(target_id, &table.name, step, &raster)
                .with_context(|| format!("Failed to write step {} of {}", step, table.name))?;

            if step % PROGRESS_INTERVAL == 0 {
                info!(event = %table.name, step, total, "Gridding progress");
            }
        }

        info!(
            event = %table.name,
            target_id = %target_id,
            stations = selection.points.len(),
            steps = total,
            "Finished event"
        );
        Ok(total)
    }

    /// Grid every event of `source`, or only the one named `only`.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K, only: Option<&str>) -> Result<RunSummary>
    where
        S: EventSource + ?Sized,
        K: RasterSink + ?Sized,
    {
        let names = source.event_names();
        info!(events = names.len(), "Found event sheets");
        if let Some(only) = only {
            if !names.iter().any(|name| name == only) {
                warn!(event = %only, "Requested event not found in source");
            }
        }

        let mut summary = RunSummary::default();
        for name in names {
            if only.is_some_and(|only| only != name) {
                continue;
            }

            let Some(target_id) = self.name_to_id.get(&name) else {
                warn!(event = %name, "No target mapping for event, skipping");
                summary.skipped.push(SkippedEvent {
                    event_name: name,
                    reason: SkipReason::UnresolvedEventName,
                });
                continue;
            };

            info!(event = %name, target_id = %target_id, "Processing event");
            let table = source
                .load_event(&name)
                .with_context(|| format!("Failed to read event {}", name))?;

            let selection = self.select_stations(&table);
            if !selection.unresolved.is_empty() {
                warn!(
                    event = %name,
                    columns = ?selection.unresolved,
                    "Dropping station columns without coordinates"
                );
                summary
                    .unresolved_stations
                    .insert(name.clone(), selection.unresolved.clone());
            }

            if selection.is_empty() {
                warn!(event = %name, "No valid stations inside grid bounds, skipping");
                summary.skipped.push(SkippedEvent {
                    event_name: name,
                    reason: SkipReason::NoStationsInScope,
                });
                continue;
            }

            let steps = self.grid_event(target_id, &table, &selection, sink)?;
            summary.processed.push(EventSummary {
                event_name: name,
                target_id: target_id.clone(),
                stations: selection.labels,
                outside_grid: selection.outside_grid,
                steps,
            });
        }

        Ok(summary)
    }
}
