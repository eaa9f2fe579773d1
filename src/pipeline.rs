//! The end-to-end run: load, explore, clean, transform, aggregate, export.

use chrono::Utc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::explore::explore;
use crate::loader::load_datasets;
use crate::output::{InsightsReport, log_insights, print_pretty, write_report, write_table};
use crate::stages::aggregator::aggregate;
use crate::stages::cleaner::clean_bookings;
use crate::stages::transformer::transform_aggregated;

/// Runs every stage once, in order. Any load or write failure aborts the run.
#[tracing::instrument(skip_all, fields(gzip = config.gzip))]
pub fn run(config: &PipelineConfig) -> Result<InsightsReport> {
    let datasets = load_datasets(&config.inputs)?;

    let exploration = explore(&datasets.bookings, &datasets.dates, config.sample_rows);

    let (bookings, cleaning) = clean_bookings(datasets.bookings);
    let aggregated = transform_aggregated(datasets.aggregated_bookings, &datasets.rooms);

    let insights = aggregate(&datasets.hotels, &bookings, &aggregated);
    log_insights(&insights);

    write_table(&bookings, &config.outputs.cleaned_bookings, config.gzip)?;
    write_table(&aggregated, &config.outputs.cleaned_aggregated, config.gzip)?;

    let report = InsightsReport {
        generated_at: Utc::now(),
        exploration,
        cleaning,
        aggregated_rows: aggregated.len(),
        insights,
    };
    print_pretty(&report);

    if let Some(path) = &config.report {
        write_report(path, &report)?;
    }

    info!("Data processing complete");
    Ok(report)
}
