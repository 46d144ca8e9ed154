//! Storm hazard preprocessing CLI.
//!
//! Converts raw flood rasters and grids hourly typhoon rainfall onto the
//! flood grid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::{StationCatalog, StationResolver, WorkbookSource};
use preprocessor::{convert_floods, CsvRasterSink, PreprocessConfig, RainGridder};

#[derive(Parser, Debug)]
#[command(name = "hazard-prep")]
#[command(about = "Prepare flood tables and IDW rain grids for storm hazard simulation")]
struct Cli {
    /// Configuration file path (defaults derived from --root)
    #[arg(short, long, global = true, env = "HAZARD_CONFIG")]
    config: Option<PathBuf>,

    /// Project root containing inputs/ and sw_data_all/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert raw ASCII flood rasters into CSV tables
    Floods,

    /// Grid rain gauge time series onto the reference flood grid
    Rain {
        /// Event id whose flood output defines grid and mask
        #[arg(long)]
        reference_event: Option<String>,

        /// Only grid the event with this sheet name
        #[arg(long)]
        only: Option<String>,
    },

    /// Run floods, then rain
    All {
        /// Event id whose flood output defines grid and mask
        #[arg(long)]
        reference_event: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json)?;

    let mut config = match &cli.config {
        Some(path) => PreprocessConfig::from_file(path)?,
        None => PreprocessConfig::for_project_root(&cli.root),
    };
    config.apply_env();

    match &cli.command {
        Command::Rain {
            reference_event: Some(id),
            ..
        }
        | Command::All {
            reference_event: Some(id),
        } => config.reference.event_id = id.clone(),
        _ => {}
    }
    config.validate().context("Invalid configuration")?;

    info!(
        output = %config.paths.output_dir.display(),
        reference = %config.reference.event_id,
        "Starting storm hazard preprocessing"
    );

    match &cli.command {
        Command::Floods => run_floods(&config),
        Command::Rain { only, .. } => run_rain(&config, only.as_deref()),
        Command::All { .. } => {
            run_floods(&config)?;
            run_rain(&config, None)
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run_floods(config: &PreprocessConfig) -> Result<()> {
    let summaries = convert_floods(config)?;

    let converted: usize = summaries.iter().map(|s| s.converted).sum();
    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    info!(
        events = summaries.len(),
        converted, failed, "Flood data processing complete"
    );
    Ok(())
}

fn run_rain(config: &PreprocessConfig, only: Option<&str>) -> Result<()> {
    let catalog = StationCatalog::from_csv_path(&config.paths.stations_csv)
        .with_context(|| format!("Failed to load {}", config.paths.stations_csv.display()))?;
    let resolver = StationResolver::with_builtin(catalog);

    let gridder = RainGridder::from_reference(config, resolver)?;

    let mut source = WorkbookSource::open(&config.paths.rain_workbook, config.workbook.clone())
        .with_context(|| {
            format!(
                "Failed to open rain workbook {}",
                config.paths.rain_workbook.display()
            )
        })?;
    let mut sink = CsvRasterSink::new(config.paths.output_dir.clone());

    let summary = gridder.run(&mut source, &mut sink, only)?;

    let summary_path = config.paths.output_dir.join("rain_summary.json");
    summary.write_json(&summary_path)?;

    info!(
        processed = summary.processed.len(),
        skipped = summary.skipped.len(),
        rasters = summary.rasters_written(),
        summary = %summary_path.display(),
        "Rain grid generation complete"
    );
    Ok(())
}
