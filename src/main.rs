//! CLI entry point for the hotel bookings pipeline.
//!
//! With no arguments it reads the five datasets from `datasets/` and writes
//! `cleaned_bookings.csv` and `aggregated_bookings_cleaned.csv` to the
//! current directory.

use anyhow::Result;
use clap::Parser;
use hotel_insights::config::{DEFAULT_SAMPLE_ROWS, InputPaths, OutputPaths, PipelineConfig};
use hotel_insights::output::print_json;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hotel_insights")]
#[command(about = "Clean hotel booking datasets and summarise occupancy and revenue", long_about = None)]
struct Cli {
    /// Directory holding the five input CSVs
    #[arg(short, long, env = "HOTEL_DATA_DIR", default_value = "datasets")]
    data_dir: PathBuf,

    /// Override the bookings fact file
    #[arg(long)]
    bookings: Option<PathBuf>,

    /// Override the aggregated bookings fact file
    #[arg(long)]
    aggregated_bookings: Option<PathBuf>,

    /// Override the hotel dimension file
    #[arg(long)]
    hotels: Option<PathBuf>,

    /// Override the room dimension file
    #[arg(long)]
    rooms: Option<PathBuf>,

    /// Override the date dimension file
    #[arg(long)]
    dates: Option<PathBuf>,

    /// Directory to write the cleaned CSVs to (defaults to the working directory)
    #[arg(short, long, env = "HOTEL_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Gzip compress the cleaned CSVs
    #[arg(long, default_value_t = false)]
    gzip: bool,

    /// Write a JSON insights report to this path
    #[arg(long, env = "HOTEL_REPORT_PATH")]
    report: Option<PathBuf>,

    /// Also log the insights report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Number of raw booking rows to log before cleaning
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    sample_rows: usize,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut inputs = InputPaths::in_dir(&self.data_dir);
        if let Some(path) = self.bookings {
            inputs.bookings = path;
        }
        if let Some(path) = self.aggregated_bookings {
            inputs.aggregated_bookings = path;
        }
        if let Some(path) = self.hotels {
            inputs.hotels = path;
        }
        if let Some(path) = self.rooms {
            inputs.rooms = path;
        }
        if let Some(path) = self.dates {
            inputs.dates = path;
        }

        let outputs = match self.output_dir {
            Some(dir) => OutputPaths::in_dir(dir),
            None => OutputPaths::default(),
        };

        PipelineConfig {
            inputs,
            outputs,
            gzip: self.gzip,
            report: self.report,
            sample_rows: self.sample_rows,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hotel_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hotel_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config();

    info!(
        bookings = %config.inputs.bookings.display(),
        output = %config.outputs.cleaned_bookings.display(),
        "Starting pipeline"
    );

    let report = hotel_insights::run(&config)?;

    if json {
        print_json(&report)?;
    }

    Ok(())
}
