//! Per-event rain gauge time series.
//!
//! The hourly rain workbook holds one sheet per typhoon, named like
//! `2009_莫拉克`. The first row is the header: a timestamp column (`DataTime`)
//! followed by one column per gauge. Each further row is one time step.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Range, Reader, Sheets};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IngestionError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn default_timestamp_column() -> String {
    "DataTime".to_string()
}

fn default_skip_markers() -> Vec<String> {
    vec!["工作表".to_string(), "Sheet".to_string()]
}

/// How event sheets are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookLayout {
    /// Header of the timestamp column; excluded from the gauge columns.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Sheets whose name contains any of these markers are not events.
    #[serde(default = "default_skip_markers")]
    pub skip_sheet_markers: Vec<String>,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            timestamp_column: default_timestamp_column(),
            skip_sheet_markers: default_skip_markers(),
        }
    }
}

impl WorkbookLayout {
    /// Check whether a sheet is a placeholder rather than an event.
    pub fn is_placeholder(&self, sheet: &str) -> bool {
        self.skip_sheet_markers
            .iter()
            .any(|marker| sheet.contains(marker.as_str()))
    }
}

/// One event's gauge readings.
///
/// `rows[t][j]` is the reading of gauge `columns[j]` at step `t`. Missing or
/// non-numeric readings are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    pub name: String,
    pub timestamps: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl EventTable {
    /// Build a table without timestamps.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            timestamps: Vec::new(),
            columns,
            rows,
        }
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.rows.len()
    }

    /// Readings of the selected columns at one step, in selection order.
    pub fn values_at(&self, step: usize, columns: &[usize]) -> Option<Vec<f64>> {
        let row = self.rows.get(step)?;
        columns.iter().map(|&j| row.get(j).copied()).collect()
    }
}

/// Anything that can hand out event tables by name.
pub trait EventSource {
    /// Event names in source order.
    fn event_names(&self) -> Vec<String>;

    /// Load one event's table.
    fn load_event(&mut self, name: &str) -> Result<EventTable>;
}

/// Event tables read from an `.xlsx`/`.xls`/`.ods` workbook.
pub struct WorkbookSource {
    workbook: Sheets<BufReader<File>>,
    layout: WorkbookLayout,
    path: PathBuf,
}

impl WorkbookSource {
    /// Open a workbook.
    pub fn open(path: &Path, layout: WorkbookLayout) -> Result<Self> {
        let workbook = open_workbook_auto(path)?;
        info!(
            path = %path.display(),
            sheets = workbook.sheet_names().len(),
            "Opened rain workbook"
        );
        Ok(Self {
            workbook,
            layout,
            path: path.to_path_buf(),
        })
    }
}

impl EventSource for WorkbookSource {
    fn event_names(&self) -> Vec<String> {
        self.workbook
            .sheet_names()
            .into_iter()
            .filter(|name| {
                let skip = self.layout.is_placeholder(name);
                if skip {
                    debug!(sheet = %name, "Skipping placeholder sheet");
                }
                !skip
            })
            .collect()
    }

    fn load_event(&mut self, name: &str) -> Result<EventTable> {
        if !self.workbook.sheet_names().iter().any(|sheet| sheet == name) {
            return Err(IngestionError::SheetNotFound(name.to_string()));
        }
        let range = self.workbook.worksheet_range(name)?;
        debug!(
            path = %self.path.display(),
            sheet = %name,
            rows = range.height(),
            "Loaded event sheet"
        );
        Ok(table_from_range(name, &range, &self.layout))
    }
}

/// Convert a sheet's cell range into an [`EventTable`].
///
/// Repeated header labels are disambiguated with a `.N` suffix (`X`, `X.1`,
/// `X.2`) and blank headers become `Unnamed: <index>`.
pub fn table_from_range(name: &str, range: &Range<Data>, layout: &WorkbookLayout) -> EventTable {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return EventTable::new(name, Vec::new(), Vec::new()),
    };

    let labels = dedup_labels(
        header
            .iter()
            .enumerate()
            .map(|(i, cell)| header_label(cell, i))
            .collect(),
    );
    let timestamp_index = labels
        .iter()
        .position(|label| *label == layout.timestamp_column);

    let data_indices: Vec<usize> = (0..labels.len())
        .filter(|i| Some(*i) != timestamp_index)
        .collect();
    let columns: Vec<String> = data_indices.iter().map(|&i| labels[i].clone()).collect();

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    for row in rows {
        if let Some(t) = timestamp_index {
            timestamps.push(row.get(t).map(timestamp_text).unwrap_or_default());
        }
        values.push(
            data_indices
                .iter()
                .map(|&i| row.get(i).map(reading).unwrap_or(f64::NAN))
                .collect(),
        );
    }

    debug!(
        sheet = %name,
        columns = columns.len(),
        steps = values.len(),
        "Read event sheet"
    );

    EventTable {
        name: name.to_string(),
        timestamps,
        columns,
        rows: values,
    }
}

fn header_label(cell: &Data, index: usize) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {}", index),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    labels
        .into_iter()
        .map(|label| {
            let count = seen.entry(label.clone()).or_insert(0);
            let out = if *count == 0 {
                label
            } else {
                format!("{}.{}", label, count)
            };
            *count += 1;
            out
        })
        .collect()
}

fn timestamp_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(format_timestamp)
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn reading(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Event tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSource {
    events: Vec<EventTable>,
}

impl MemoryEventSource {
    pub fn new(events: Vec<EventTable>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, table: EventTable) {
        self.events.push(table);
    }
}

impl EventSource for MemoryEventSource {
    fn event_names(&self) -> Vec<String> {
        self.events.iter().map(|e| e.name.clone()).collect()
    }

    fn load_event(&mut self, name: &str) -> Result<EventTable> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| IngestionError::SheetNotFound(name.to_string()))
    }
}
