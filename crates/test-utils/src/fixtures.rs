//! Common test fixtures for storm hazard preprocessing tests.
//!
//! This module provides pre-defined grids, catalogs and a temporary project
//! tree that mirror the layout a real run works against.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Common grid definitions for testing.
pub mod grid {
    /// Grid specification for testing, kept free of workspace types.
    #[derive(Debug, Clone, Copy)]
    pub struct GridFixture {
        pub ncols: usize,
        pub nrows: usize,
        pub xllcorner: f64,
        pub yllcorner: f64,
        pub cellsize: f64,
        pub nodata: f64,
    }

    impl GridFixture {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.ncols * self.nrows
        }

        /// Returns the ESRI header text for this grid.
        pub fn header(&self) -> String {
            crate::esri_header(
                self.ncols,
                self.nrows,
                self.xllcorner,
                self.yllcorner,
                self.cellsize,
                self.nodata,
            )
        }
    }

    /// 2x2 grid with 10 m cells anchored at the origin.
    pub const TINY_2X2: GridFixture = GridFixture {
        ncols: 2,
        nrows: 2,
        xllcorner: 0.0,
        yllcorner: 0.0,
        cellsize: 10.0,
        nodata: -9999.0,
    };

    /// Coarse TWD97 grid over the Yunlin coastal plain (1 km cells).
    ///
    /// Covers X 160–220 km, Y 2580–2640 km, which includes the Taixi,
    /// Huwei and 01J100 gauges but not Taipei.
    pub const YUNLIN_1KM: GridFixture = GridFixture {
        ncols: 60,
        nrows: 60,
        xllcorner: 160_000.0,
        yllcorner: 2_580_000.0,
        cellsize: 1000.0,
        nodata: -9999.0,
    };
}

/// Station catalog fixtures.
pub mod stations {
    /// Catalog with one gauge inside the Yunlin grid, one far north of it
    /// and an extra column the loader must ignore.
    pub const CATALOG_CSV: &str = "\
StationId,StationName,Latitude_WGS84,Longitude_WGS84,County
C0K400, 古坑 ,23.6420,120.5630,雲林縣
466920,臺北,25.0377,121.5149,臺北市
";

    /// Catalog whose second row has an unparsable latitude.
    pub const CATALOG_WITH_BAD_ROW_CSV: &str = "\
StationId,StationName,Latitude_WGS84,Longitude_WGS84
C0K400,古坑,23.6420,120.5630
C0X999,壞站,not-a-number,120.0
";
}

/// A temporary project tree: `inputs/` and `sw_data_all/` under one root.
///
/// The directory is removed when the value is dropped.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// Create an empty project with `inputs/` and `sw_data_all/`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("inputs")).expect("Failed to create inputs dir");
        fs::create_dir_all(dir.path().join("sw_data_all")).expect("Failed to create output dir");
        Self { dir }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `inputs/` directory.
    pub fn inputs(&self) -> PathBuf {
        self.root().join("inputs")
    }

    /// `sw_data_all/` directory.
    pub fn output(&self) -> PathBuf {
        self.root().join("sw_data_all")
    }

    /// Write a file relative to the project root, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Read a file relative to the project root.
    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        fs::read_to_string(self.root().join(relative)).expect("Failed to read project file")
    }

    /// Sorted file names directly inside a directory relative to the root.
    pub fn list(&self, relative: impl AsRef<Path>) -> Vec<String> {
        let dir = self.root().join(relative);
        let mut names: Vec<String> = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_fixture_header() {
        let header = grid::TINY_2X2.header();
        assert!(header.starts_with("ncols         2\n"));
        assert_eq!(header.lines().count(), 6);
        assert_eq!(grid::YUNLIN_1KM.size(), 3600);
    }

    #[test]
    fn test_temp_project_layout() {
        let project = TempProject::new();
        assert!(project.inputs().is_dir());
        assert!(project.output().is_dir());

        project.write("sw_data_all/t1/rain/a.csv", "1,2\n");
        project.write("sw_data_all/t1/rain/b.csv", "3,4\n");
        assert_eq!(project.list("sw_data_all/t1/rain"), vec!["a.csv", "b.csv"]);
        assert_eq!(project.read("sw_data_all/t1/rain/b.csv"), "3,4\n");
        assert!(project.list("missing").is_empty());
    }
}
