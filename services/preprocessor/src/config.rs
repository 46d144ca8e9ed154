//! Preprocessor configuration.

use anyhow::{bail, Context, Result};
use ingestion::WorkbookLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Top-level preprocessor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Raw flood folder id -> event target id
    #[serde(default = "default_flood_folders")]
    pub flood_folders: BTreeMap<String, String>,

    /// Event target id -> workbook sheet name
    #[serde(default = "default_events")]
    pub events: BTreeMap<String, String>,

    /// Where the grid geometry and mask are taken from
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Rain workbook layout
    #[serde(default)]
    pub workbook: WorkbookLayout,
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub inputs_dir: PathBuf,
    pub output_dir: PathBuf,
    pub raw_flood_dir: PathBuf,
    pub rain_workbook: PathBuf,
    pub stations_csv: PathBuf,
}

/// Reference event whose flood output defines the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_event")]
    pub event_id: String,

    /// Converted flood raster used as the mask
    #[serde(default = "default_reference_raster")]
    pub raster: String,

    /// Grid header file next to the raster
    #[serde(default = "default_reference_metadata")]
    pub metadata: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            event_id: default_reference_event(),
            raster: default_reference_raster(),
            metadata: default_reference_metadata(),
        }
    }
}

fn default_reference_event() -> String {
    "t5".to_string()
}

fn default_reference_raster() -> String {
    "dm1d0000.csv".to_string()
}

fn default_reference_metadata() -> String {
    "metadata.txt".to_string()
}

fn default_flood_folders() -> BTreeMap<String, String> {
    [
        ("20", "t3"),
        ("21", "t4"),
        ("22", "t5"),
        ("23", "t6"),
        ("24", "t7"),
        ("25", "t8"),
        ("26", "t9"),
        ("27", "t10"),
        ("28", "t11"),
        ("29", "t12"),
        ("30", "t13"),
        ("31", "t1"),
        ("32", "t2"),
    ]
    .into_iter()
    .map(|(folder, id)| (folder.to_string(), id.to_string()))
    .collect()
}

fn default_events() -> BTreeMap<String, String> {
    [
        ("t1", "2001_桃芝"),
        ("t2", "2004_敏督利"),
        ("t3", "2005_海棠"),
        ("t4", "2008_辛樂克"),
        ("t5", "2009_莫拉克"),
        ("t6", "2012_蘇拉"),
        ("t7", "2013_蘇力"),
        ("t8", "2015_蘇迪勒"),
        ("t9", "2016_梅姬"),
        ("t10", "2017_尼莎"),
        ("t11", "2017_海棠"),
        ("t12", "2021_盧碧"),
        ("t13", "2023_杜蘇芮"),
    ]
    .into_iter()
    .map(|(id, name)| (id.to_string(), name.to_string()))
    .collect()
}

impl PreprocessConfig {
    /// Default configuration for a project laid out as
    /// `<root>/inputs/...` with output in `<root>/sw_data_all`.
    pub fn for_project_root(root: &Path) -> Self {
        let inputs_dir = root.join("inputs");
        Self {
            paths: PathsConfig {
                output_dir: root.join("sw_data_all"),
                raw_flood_dir: inputs_dir.join("raw_flood_data"),
                rain_workbook: inputs_dir.join("typhoon_hourly_rain_up_to_2023_OK.xlsx"),
                stations_csv: inputs_dir.join("CWA_rain_targets_20251126_2323.csv"),
                inputs_dir,
            },
            flood_folders: default_flood_folders(),
            events: default_events(),
            reference: ReferenceConfig::default(),
            workbook: WorkbookLayout::default(),
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: PreprocessConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Override paths from `HAZARD_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| env::var(key).ok());
    }

    /// Override paths using an arbitrary variable lookup.
    ///
    /// A new inputs directory moves the raw flood folder, rain workbook and
    /// station catalog with it, keeping their names. Their own variables
    /// still take precedence.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        if let Some(inputs_dir) = var("HAZARD_INPUTS_DIR") {
            for path in [
                &mut self.paths.raw_flood_dir,
                &mut self.paths.rain_workbook,
                &mut self.paths.stations_csv,
            ] {
                if let Some(name) = path.file_name() {
                    *path = inputs_dir.join(name);
                }
            }
            self.paths.inputs_dir = inputs_dir;
        }

        let overrides: [(&str, &mut PathBuf); 4] = [
            ("HAZARD_OUTPUT_DIR", &mut self.paths.output_dir),
            ("HAZARD_RAW_FLOOD_DIR", &mut self.paths.raw_flood_dir),
            ("HAZARD_RAIN_WORKBOOK", &mut self.paths.rain_workbook),
            ("HAZARD_STATIONS_CSV", &mut self.paths.stations_csv),
        ];
        for (key, slot) in overrides {
            if let Some(value) = var(key) {
                *slot = value;
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.flood_folders.is_empty() {
            bail!("flood_folders must map at least one folder");
        }
        if self.events.is_empty() {
            bail!("events must map at least one event");
        }
        if !self.events.contains_key(&self.reference.event_id) {
            bail!(
                "reference event '{}' is not listed in events",
                self.reference.event_id
            );
        }
        if self.workbook.timestamp_column.is_empty() {
            bail!("workbook.timestamp_column must not be empty");
        }
        Ok(())
    }

    /// Sheet name -> event target id.
    pub fn name_to_id(&self) -> BTreeMap<String, String> {
        self.events
            .iter()
            .map(|(id, name)| (name.clone(), id.clone()))
            .collect()
    }

    /// Sheet name for a target id.
    pub fn event_name(&self, id: &str) -> Option<&str> {
        self.events.get(id).map(String::as_str)
    }

    /// Directory holding converted flood tables for one target.
    pub fn flood_dir(&self, target_id: &str) -> PathBuf {
        self.paths.output_dir.join(target_id).join("flood")
    }

    /// Converted flood directory of the reference event.
    pub fn reference_dir(&self) -> PathBuf {
        self.flood_dir(&self.reference.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_project_root_defaults() {
        let config = PreprocessConfig::for_project_root(Path::new("/data/storm"));

        assert_eq!(config.paths.inputs_dir, PathBuf::from("/data/storm/inputs"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/data/storm/sw_data_all"));
        assert_eq!(
            config.paths.raw_flood_dir,
            PathBuf::from("/data/storm/inputs/raw_flood_data")
        );
        assert_eq!(config.flood_folders.len(), 13);
        assert_eq!(config.flood_folders["22"], "t5");
        assert_eq!(config.events.len(), 13);
        assert_eq!(
            config.reference_dir(),
            PathBuf::from("/data/storm/sw_data_all/t5/flood")
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_event_lookups() {
        let config = PreprocessConfig::for_project_root(Path::new("/p"));

        let name_to_id = config.name_to_id();
        assert_eq!(name_to_id.len(), 13);
        assert_eq!(name_to_id["2009_莫拉克"], "t5");
        assert_eq!(name_to_id["2017_海棠"], "t11");
        assert_eq!(name_to_id["2005_海棠"], "t3");
        assert!(!name_to_id.contains_key("1999_unknown"));
        assert_eq!(config.event_name("t13"), Some("2023_杜蘇芮"));
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = r#"
paths:
  inputs_dir: /in
  output_dir: /out
  raw_flood_dir: /in/raw
  rain_workbook: /in/rain.xlsx
  stations_csv: /in/stations.csv
reference:
  event_id: t1
"#;
        let config: PreprocessConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.paths.output_dir, PathBuf::from("/out"));
        assert_eq!(config.reference.event_id, "t1");
        assert_eq!(config.reference.raster, "dm1d0000.csv");
        assert_eq!(config.workbook.timestamp_column, "DataTime");
        assert_eq!(config.flood_folders["31"], "t1");
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PreprocessConfig::for_project_root(Path::new("/p"));
        let vars: HashMap<&str, &str> = [
            ("HAZARD_OUTPUT_DIR", "/scratch/out"),
            ("HAZARD_STATIONS_CSV", ""),
        ]
        .into_iter()
        .collect();

        config.apply_env_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.paths.output_dir, PathBuf::from("/scratch/out"));
        // Empty values leave the default in place
        assert_eq!(
            config.paths.stations_csv,
            PathBuf::from("/p/inputs/CWA_rain_targets_20251126_2323.csv")
        );
    }

    #[test]
    fn test_inputs_dir_override_moves_input_paths() {
        let mut config = PreprocessConfig::for_project_root(Path::new("/p"));
        config.apply_env_from(|key| (key == "HAZARD_INPUTS_DIR").then(|| "/elsewhere".to_string()));

        assert_eq!(config.paths.inputs_dir, PathBuf::from("/elsewhere"));
        assert_eq!(
            config.paths.raw_flood_dir,
            PathBuf::from("/elsewhere/raw_flood_data")
        );
        assert_eq!(
            config.paths.rain_workbook,
            PathBuf::from("/elsewhere/typhoon_hourly_rain_up_to_2023_OK.xlsx")
        );
        assert_eq!(
            config.paths.stations_csv,
            PathBuf::from("/elsewhere/CWA_rain_targets_20251126_2323.csv")
        );
        assert_eq!(config.paths.output_dir, PathBuf::from("/p/sw_data_all"));
    }

    #[test]
    fn test_specific_path_override_beats_inputs_dir() {
        let mut config = PreprocessConfig::for_project_root(Path::new("/p"));
        let vars: HashMap<&str, &str> = [
            ("HAZARD_INPUTS_DIR", "/elsewhere"),
            ("HAZARD_RAIN_WORKBOOK", "/shared/rain.xlsx"),
        ]
        .into_iter()
        .collect();

        config.apply_env_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.paths.rain_workbook, PathBuf::from("/shared/rain.xlsx"));
        assert_eq!(
            config.paths.stations_csv,
            PathBuf::from("/elsewhere/CWA_rain_targets_20251126_2323.csv")
        );
    }

    #[test]
    fn test_validate_rejects_unmapped_reference() {
        let mut config = PreprocessConfig::for_project_root(Path::new("/p"));
        config.reference.event_id = "t99".to_string();
        assert!(config.validate().is_err());

        let mut config = PreprocessConfig::for_project_root(Path::new("/p"));
        config.flood_folders.clear();
        assert!(config.validate().is_err());
    }
}
