//! Export of cleaned tables and the insights report.
//!
//! Tables are always written with full-overwrite semantics, optionally
//! gzip-compressed. The report can be logged or persisted as JSON.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::explore::ExplorationSummary;
use crate::stages::types::{CleaningReport, GroupStat, Insights};
use crate::table::Table;

/// Everything a run learned about the data, in one serializable record.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub generated_at: DateTime<Utc>,
    pub exploration: ExplorationSummary,
    pub cleaning: CleaningReport,
    pub aggregated_rows: usize,
    pub insights: Insights,
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

/// Writes `table` to `path`, replacing any existing file. With `gzip` the data
/// is compressed and `.gz` is appended to the path.
///
/// Returns the path actually written.
pub fn write_table<T>(table: &Table<T>, path: &Path, gzip: bool) -> Result<PathBuf> {
    let path = if gzip { gz_path(path) } else { path.to_path_buf() };
    let write_error = |source: std::io::Error| PipelineError::Write {
        path: path.clone(),
        source,
    };

    let mut body = Vec::new();
    table
        .write_to(&mut csv::Writer::from_writer(&mut body))
        .map_err(|e| write_error(e.into()))?;

    if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body).map_err(write_error)?;
        body = encoder.finish().map_err(write_error)?;
    }

    fs::write(&path, body).map_err(write_error)?;
    info!(path = %path.display(), rows = table.len(), gzip, "Table exported");

    Ok(path)
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &InsightsReport) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &InsightsReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Persists the report as pretty-printed JSON, replacing any existing file.
pub fn write_report(path: &Path, report: &InsightsReport) -> Result<()> {
    let body = serde_json::to_vec_pretty(report)?;
    fs::write(path, body).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Insights report written");
    Ok(())
}

fn log_group(title: &str, stats: &[GroupStat]) {
    for stat in stats {
        info!(group = %stat.key, value = ?stat.value, "{title}");
    }
}

/// Logs the grouped summaries, one line per group.
pub fn log_insights(insights: &Insights) {
    log_group("Average occupancy by room class", &insights.room_occupancy);
    log_group("Average occupancy per city", &insights.city_occupancy);
    log_group("Total revenue by city", &insights.revenue_by_city);
    log_group("Revenue realized per city (ranked)", &insights.revenue_by_city_ranked);
}
