//! Rain gauge coordinates.
//!
//! Workbook columns name gauges either by CWA station id (`C0K280`,
//! `01J100`) or by township name (`臺西`). Coordinates come from two places:
//! a built-in table of gauges known to sit in the Yunlin/Chiayi study area,
//! and the CWA station catalog CSV. [`StationResolver`] merges both into a
//! single ordered lookup.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use hazard_common::GeoPoint;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;

/// Built-in gauge coordinates as `(key, latitude, longitude)` in WGS84 degrees.
static BUILTIN_STATIONS: &[(&str, f64, f64)] = &[
    ("467480", 23.4958, 120.4334),
    ("C0K280", 23.7032, 120.1983),
    ("C0K300", 23.5746, 120.3024),
    ("C0K330", 23.719183, 120.442036),
    ("C0M530", 23.7602, 120.3539),
    ("C1K230", 23.8387, 120.4324),
    ("C1K250", 23.6391, 120.2263),
    ("C1K260", 23.5828, 120.1837),
    ("C1K270", 23.5755, 120.2458),
    ("C1K310", 23.6765, 120.3927),
    ("C1K320", 23.6483, 120.3130),
    ("C1K340", 23.6763, 120.4792),
    ("C1K350", 23.6455, 120.4300),
    ("C1K380", 23.7632, 120.5057),
    ("C1M470", 23.6391, 120.2263),
    ("C1M500", 23.7082, 120.4339),
    ("C1M510", 23.6765, 120.3927),
    ("C1M520", 23.7011, 120.3111),
    ("C1M540", 23.6744, 120.2526),
    ("C1M560", 23.7536, 120.2526),
    ("01J100", 23.800493, 120.464851),
    ("01J930", 23.755254, 120.612491),
    ("01J960", 23.7599, 120.6179),
    ("01J970", 23.584167, 120.695634),
    ("01K060", 23.701086, 120.311047),
    ("01L360", 23.424513, 120.641716),
    ("01L390", 23.475173, 120.620189),
    ("01L480", 23.533049, 120.602587),
    ("01L490", 23.530321, 120.520569),
    ("01L910", 23.570458, 120.520964),
    ("01M010", 23.587551, 120.40001),
    ("O1J81", 23.5746, 120.3024),
    // Township names
    ("麥寮", 23.7536, 120.2526),
    ("崙背", 23.7602, 120.3539),
    ("莿桐", 23.7632, 120.5057),
    ("林內", 23.7599, 120.6179),
    ("斗六", 23.7092, 120.5435),
    ("斗南", 23.6763, 120.4792),
    ("虎尾", 23.7082, 120.4339),
    ("土庫", 23.6765, 120.3927),
    ("元長", 23.6483, 120.3130),
    ("褒忠", 23.7011, 120.3111),
    ("東勢", 23.6744, 120.2526),
    ("臺西", 23.7032, 120.1983),
    ("四湖", 23.6391, 120.2263),
    ("口湖", 23.5828, 120.1837),
    ("水林", 23.5755, 120.2458),
    ("北港", 23.5746, 120.3024),
    ("大埤", 23.6455, 120.4300),
];

/// The built-in gauge table keyed by station id or township name.
pub fn builtin_stations() -> HashMap<String, GeoPoint> {
    BUILTIN_STATIONS
        .iter()
        .map(|(key, lat, lon)| (key.to_string(), GeoPoint::new(*lat, *lon)))
        .collect()
}

/// One row of the CWA station catalog. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(rename = "StationId")]
    id: String,
    #[serde(rename = "StationName")]
    name: String,
    #[serde(rename = "Latitude_WGS84")]
    latitude: f64,
    #[serde(rename = "Longitude_WGS84")]
    longitude: f64,
}

/// Station coordinates loaded from the CWA catalog, keyed by id and by name.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    by_id: HashMap<String, GeoPoint>,
    by_name: HashMap<String, GeoPoint>,
}

impl StationCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the catalog CSV at `path`.
    ///
    /// A missing file is not an error: a warning is logged and an empty
    /// catalog returned, leaving the built-in table as the only source.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Station catalog not found, using built-in table only");
            return Ok(Self::empty());
        }

        let catalog = Self::from_reader(File::open(path)?)?;
        info!(
            path = %path.display(),
            stations = catalog.len(),
            "Loaded station catalog"
        );
        Ok(catalog)
    }

    /// Load a catalog from CSV text with a header row.
    ///
    /// Ids and names are trimmed. Rows that fail to parse are skipped with a
    /// warning. A later row with the same id or name replaces the earlier one.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut catalog = Self::empty();
        for (index, result) in rdr.deserialize::<CatalogRecord>().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!(row = index + 1, error = %e, "Skipping unreadable catalog row");
                    continue;
                }
            };
            let point = GeoPoint::new(record.latitude, record.longitude);
            catalog.by_id.insert(record.id.trim().to_string(), point);
            catalog.by_name.insert(record.name.trim().to_string(), point);
        }

        Ok(catalog)
    }

    /// Look up a station by its catalog id.
    pub fn by_id(&self, id: &str) -> Option<GeoPoint> {
        self.by_id.get(id).copied()
    }

    /// Look up a station by its display name.
    pub fn by_name(&self, name: &str) -> Option<GeoPoint> {
        self.by_name.get(name).copied()
    }

    /// Number of catalog rows loaded (distinct ids).
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Ordered lookup over the built-in table and the catalog.
///
/// Sources are consulted in order: built-in table, catalog by id, catalog by
/// name. Matching is exact.
#[derive(Debug, Clone)]
pub struct StationResolver {
    builtin: HashMap<String, GeoPoint>,
    catalog: StationCatalog,
}

impl StationResolver {
    pub fn new(builtin: HashMap<String, GeoPoint>, catalog: StationCatalog) -> Self {
        Self { builtin, catalog }
    }

    /// Resolver over the built-in table and the given catalog.
    pub fn with_builtin(catalog: StationCatalog) -> Self {
        Self::new(builtin_stations(), catalog)
    }

    /// Resolve an exact station key.
    pub fn resolve(&self, key: &str) -> Option<GeoPoint> {
        self.builtin
            .get(key)
            .copied()
            .or_else(|| self.catalog.by_id(key))
            .or_else(|| self.catalog.by_name(key))
    }

    /// Resolve a workbook column label.
    ///
    /// Labels may carry a `.N` suffix (`01J100.1`). Within each source the
    /// full label is tried first, then the text before the first `.`,
    /// trimmed.
    pub fn resolve_column(&self, label: &str) -> Option<GeoPoint> {
        let base = base_label(label);

        let builtin = |key: &str| self.builtin.get(key).copied();
        let by_id = |key: &str| self.catalog.by_id(key);
        let by_name = |key: &str| self.catalog.by_name(key);

        builtin(label)
            .or_else(|| builtin(base))
            .or_else(|| by_id(label))
            .or_else(|| by_id(base))
            .or_else(|| by_name(label))
            .or_else(|| by_name(base))
    }

    /// Number of entries in the built-in table.
    pub fn builtin_len(&self) -> usize {
        self.builtin.len()
    }

    /// The catalog behind this resolver.
    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }
}

/// Column label with any `.N` suffix removed.
pub fn base_label(label: &str) -> &str {
    label.split('.').next().unwrap_or(label).trim()
}
