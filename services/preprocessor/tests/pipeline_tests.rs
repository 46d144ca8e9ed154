//! End-to-end tests of flood conversion and rain gridding on a temp project.

use grid_processor::Raster;
use ingestion::{EventTable, MemoryEventSource, StationCatalog, StationResolver};
use preprocessor::{
    convert_floods, CsvRasterSink, PreprocessConfig, RainGridder, RasterSink, SkipReason,
};
use test_utils::{
    basin_border_cells, create_basin_raster, fixtures::grid, fixtures::stations,
    format_ascii_grid, format_csv_raster, TempProject,
};

const MORAKOT: &str = "2009_莫拉克";
const TORAJI: &str = "2001_桃芝";

/// Project with the t5 reference flood output already in place.
fn project_with_reference() -> TempProject {
    let project = TempProject::new();
    let fixture = grid::YUNLIN_1KM;
    let depths = create_basin_raster(fixture.ncols, fixture.nrows, fixture.nodata);
    project.write("sw_data_all/t5/flood/metadata.txt", fixture.header());
    project.write(
        "sw_data_all/t5/flood/dm1d0000.csv",
        format_csv_raster(&depths, fixture.ncols),
    );
    project.write("inputs/CWA_rain_targets_20251126_2323.csv", stations::CATALOG_CSV);
    project
}

fn gridder(project: &TempProject) -> RainGridder {
    let config = PreprocessConfig::for_project_root(project.root());
    let catalog = StationCatalog::from_csv_path(&config.paths.stations_csv).unwrap();
    RainGridder::from_reference(&config, StationResolver::with_builtin(catalog)).unwrap()
}

fn columns(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn events() -> MemoryEventSource {
    MemoryEventSource::new(vec![
        EventTable::new(
            "1999_unknown",
            columns(&["C0K280"]),
            vec![vec![1.0], vec![2.0]],
        ),
        EventTable::new(
            MORAKOT,
            columns(&["C0K280", "01J100.1", "466920", "GHOST"]),
            vec![
                vec![10.0, 20.0, 99.0, 1.0],
                vec![0.0, 0.0, 99.0, 1.0],
                vec![35.5, 12.25, 99.0, 1.0],
            ],
        ),
        EventTable::new(
            TORAJI,
            columns(&["466920", "GHOST"]),
            vec![vec![5.0, 5.0]],
        ),
    ])
}

/// Parse a written raster back into rows of fields.
fn read_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_rain_run_writes_masked_rasters() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut source = events();
    let mut sink = CsvRasterSink::new(project.output());
    let summary = gridder.run(&mut source, &mut sink, None).unwrap();

    // Only Morakot is gridded, from the two in-bounds gauges
    assert_eq!(summary.processed.len(), 1);
    let event = &summary.processed[0];
    assert_eq!(event.target_id, "t5");
    assert_eq!(event.stations, vec!["C0K280", "01J100.1"]);
    assert_eq!(event.outside_grid, vec!["466920"]);
    assert_eq!(event.steps, 3);
    assert_eq!(summary.rasters_written(), 3);
    assert_eq!(sink.written(), 3);

    assert_eq!(
        project.list("sw_data_all/t5/rain"),
        vec![
            "2009_莫拉克_0000.csv",
            "2009_莫拉克_0001.csv",
            "2009_莫拉克_0002.csv"
        ]
    );

    // Shape and mask of every raster
    let fixture = grid::YUNLIN_1KM;
    for step in 0..3 {
        let text = project.read(format!("sw_data_all/t5/rain/{}_{:04}.csv", MORAKOT, step));
        let rows = read_rows(&text);
        assert_eq!(rows.len(), fixture.nrows);
        assert!(rows.iter().all(|r| r.len() == fixture.ncols));

        let masked = rows
            .iter()
            .flatten()
            .filter(|field| field.as_str() == "-9999.0")
            .count();
        assert_eq!(masked, basin_border_cells(fixture.ncols, fixture.nrows));
        assert!(rows[0].iter().all(|f| f == "-9999.0"));
    }

    // Step 1 reads zero at both gauges, so every unmasked cell is zero
    let rows = read_rows(&project.read(format!("sw_data_all/t5/rain/{}_0001.csv", MORAKOT)));
    assert_eq!(rows[1][1], "0.0");
    assert_eq!(rows[30][30], "0.0");

    // Interior values stay within the gauge range
    let rows = read_rows(&project.read(format!("sw_data_all/t5/rain/{}_0002.csv", MORAKOT)));
    for field in rows[1..59].iter().flat_map(|r| r[1..59].iter()) {
        let value: f64 = field.parse().unwrap();
        assert!(
            value >= 12.25 - 1e-9 && value <= 35.5 + 1e-9,
            "value {} out of range",
            value
        );
    }
}

#[test]
fn test_skipped_events_are_reported() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut sink = CsvRasterSink::new(project.output());
    let summary = gridder.run(&mut events(), &mut sink, None).unwrap();

    let skipped: Vec<(&str, SkipReason)> = summary
        .skipped
        .iter()
        .map(|s| (s.event_name.as_str(), s.reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("1999_unknown", SkipReason::UnresolvedEventName),
            (TORAJI, SkipReason::NoStationsInScope),
        ]
    );
    assert_eq!(summary.unresolved_stations[MORAKOT], vec!["GHOST"]);
    assert_eq!(summary.unresolved_stations[TORAJI], vec!["GHOST"]);

    // Nothing written for the skipped events
    assert_eq!(project.list("sw_data_all"), vec!["t5"]);
    assert_eq!(project.list("sw_data_all/t5"), vec!["flood", "rain"]);
}

#[test]
fn test_single_station_fills_grid_exactly() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut source = MemoryEventSource::new(vec![EventTable::new(
        MORAKOT,
        columns(&["臺西"]),
        vec![vec![12.5]],
    )]);
    let mut sink = CsvRasterSink::new(project.output());
    gridder.run(&mut source, &mut sink, None).unwrap();

    let rows = read_rows(&project.read(format!("sw_data_all/t5/rain/{}_0000.csv", MORAKOT)));
    let fixture = grid::YUNLIN_1KM;
    for (r, row) in rows.iter().enumerate() {
        for (c, field) in row.iter().enumerate() {
            let border = r == 0 || c == 0 || r + 1 == fixture.nrows || c + 1 == fixture.ncols;
            let expected = if border { "-9999.0" } else { "12.5" };
            assert_eq!(field, expected, "cell ({}, {})", r, c);
        }
    }
}

#[test]
fn test_missing_reading_blanks_unmasked_cells() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut source = MemoryEventSource::new(vec![EventTable::new(
        MORAKOT,
        columns(&["C0K280", "01J100.1"]),
        vec![vec![f64::NAN, 4.0], vec![2.0, 4.0]],
    )]);
    let mut sink = CsvRasterSink::new(project.output());
    gridder.run(&mut source, &mut sink, None).unwrap();

    let fixture = grid::YUNLIN_1KM;
    let rows = read_rows(&project.read(format!("sw_data_all/t5/rain/{}_0000.csv", MORAKOT)));
    assert_eq!(rows.len(), fixture.nrows);
    for (r, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), fixture.ncols);
        for (c, field) in row.iter().enumerate() {
            let border = r == 0 || c == 0 || r + 1 == fixture.nrows || c + 1 == fixture.ncols;
            let expected = if border { "-9999.0" } else { "" };
            assert_eq!(field, expected, "cell ({}, {})", r, c);
        }
    }

    // The next step has both readings and is gridded normally
    let rows = read_rows(&project.read(format!("sw_data_all/t5/rain/{}_0001.csv", MORAKOT)));
    assert_eq!(rows[0][0], "-9999.0");
    let value: f64 = rows[30][30].parse().unwrap();
    assert!((2.0 - 1e-9..=4.0 + 1e-9).contains(&value));
}

#[test]
fn test_only_filter_limits_run() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut sink = CsvRasterSink::new(project.output());
    let summary = gridder.run(&mut events(), &mut sink, Some(TORAJI)).unwrap();

    assert!(summary.processed.is_empty());
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].event_name, TORAJI);
}

#[test]
fn test_runs_are_byte_identical() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    gridder
        .run(&mut events(), &mut CsvRasterSink::new(first.path()), None)
        .unwrap();
    gridder
        .run(&mut events(), &mut CsvRasterSink::new(second.path()), None)
        .unwrap();

    for step in 0..3 {
        let name = format!("t5/rain/{}_{:04}.csv", MORAKOT, step);
        let a = std::fs::read(first.path().join(&name)).unwrap();
        let b = std::fs::read(second.path().join(&name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

/// Sink that keeps rasters in memory.
#[derive(Default)]
struct VecSink {
    written: Vec<(String, String, usize, Raster)>,
}

impl RasterSink for VecSink {
    fn write(
        &mut self,
        target_id: &str,
        event_name: &str,
        step: usize,
        raster: &Raster,
    ) -> ingestion::Result<()> {
        self.written.push((
            target_id.to_string(),
            event_name.to_string(),
            step,
            raster.clone(),
        ));
        Ok(())
    }
}

#[test]
fn test_custom_sink_receives_steps_in_order() {
    let project = project_with_reference();
    let gridder = gridder(&project);

    let mut sink = VecSink::default();
    gridder.run(&mut events(), &mut sink, None).unwrap();

    let steps: Vec<usize> = sink.written.iter().map(|w| w.2).collect();
    assert_eq!(steps, vec![0, 1, 2]);
    assert!(sink
        .written
        .iter()
        .all(|(id, name, _, raster)| id == "t5" && name == MORAKOT && raster.nrows() == 60));
    assert_eq!(
        gridder.mask().invalid_count(),
        basin_border_cells(60, 60)
    );
}

#[test]
fn test_missing_reference_is_fatal() {
    let project = TempProject::new();
    let config = PreprocessConfig::for_project_root(project.root());
    let resolver = StationResolver::with_builtin(StationCatalog::empty());

    let err = match RainGridder::from_reference(&config, resolver) {
        Ok(_) => panic!("reference should be missing"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("run the floods step first"));
}

#[test]
fn test_mismatched_reference_raster_is_fatal() {
    let project = TempProject::new();
    project.write("sw_data_all/t5/flood/metadata.txt", grid::YUNLIN_1KM.header());
    project.write("sw_data_all/t5/flood/dm1d0000.csv", "1,2\n3,4\n");
    let config = PreprocessConfig::for_project_root(project.root());
    let resolver = StationResolver::with_builtin(StationCatalog::empty());

    assert!(RainGridder::from_reference(&config, resolver).is_err());
}

#[test]
fn test_floods_then_rain() {
    let project = TempProject::new();
    let fixture = grid::YUNLIN_1KM;
    let depths = create_basin_raster(fixture.ncols, fixture.nrows, fixture.nodata);
    let asc = format_ascii_grid(&fixture.header(), &depths, fixture.ncols);
    project.write("inputs/raw_flood_data/22/dm1d0001.asc", &asc);
    project.write("inputs/raw_flood_data/22/dm1d0000.asc", &asc);
    project.write("inputs/raw_flood_data/22/dm1maxd0.asc", &asc);
    project.write("inputs/raw_flood_data/31/dm1d0000.asc", "ncols 1\n");
    project.write("inputs/raw_flood_data/32/notes.txt", "empty event");

    let config = PreprocessConfig::for_project_root(project.root());
    let summaries = convert_floods(&config).unwrap();

    // Folder 31 maps to t1, 22 to t5; 32 holds no rasters
    assert_eq!(summaries.len(), 2);
    let t5 = summaries.iter().find(|s| s.target_id == "t5").unwrap();
    assert_eq!((t5.files_found, t5.converted, t5.failed), (3, 3, 0));
    assert!(t5.metadata_written);
    let t1 = summaries.iter().find(|s| s.target_id == "t1").unwrap();
    assert!(!t1.metadata_written);

    assert_eq!(
        project.list("sw_data_all/t5/flood"),
        vec![
            "dm1d0000.csv",
            "dm1d0001.csv",
            "dm1maxd0.csv",
            "metadata.txt"
        ]
    );
    assert_eq!(
        project.read("sw_data_all/t5/flood/metadata.txt"),
        fixture.header()
    );

    // The converted t5 output now serves as the rain reference
    let gridder = RainGridder::from_reference(
        &config,
        StationResolver::with_builtin(StationCatalog::empty()),
    )
    .unwrap();
    assert_eq!(gridder.spec().len(), fixture.size());
}

#[test]
fn test_floods_without_raw_root_fails() {
    let project = TempProject::new();
    let config = PreprocessConfig::for_project_root(project.root());
    assert!(convert_floods(&config).is_err());
}
