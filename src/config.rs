//! Input and output locations for a pipeline run.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "datasets";
pub const BOOKINGS_FILE: &str = "fact_bookings.csv";
pub const DATES_FILE: &str = "dim_date.csv";
pub const HOTELS_FILE: &str = "dim_hotels.csv";
pub const ROOMS_FILE: &str = "dim_rooms.csv";
pub const AGGREGATED_BOOKINGS_FILE: &str = "fact_aggregated_bookings.csv";

pub const CLEANED_BOOKINGS_FILE: &str = "cleaned_bookings.csv";
pub const CLEANED_AGGREGATED_FILE: &str = "aggregated_bookings_cleaned.csv";

pub const DEFAULT_SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub bookings: PathBuf,
    pub dates: PathBuf,
    pub hotels: PathBuf,
    pub rooms: PathBuf,
    pub aggregated_bookings: PathBuf,
}

impl InputPaths {
    /// The five dataset files under `dir`, using their standard names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            bookings: dir.join(BOOKINGS_FILE),
            dates: dir.join(DATES_FILE),
            hotels: dir.join(HOTELS_FILE),
            rooms: dir.join(ROOMS_FILE),
            aggregated_bookings: dir.join(AGGREGATED_BOOKINGS_FILE),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub cleaned_bookings: PathBuf,
    pub cleaned_aggregated: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cleaned_bookings: dir.join(CLEANED_BOOKINGS_FILE),
            cleaned_aggregated: dir.join(CLEANED_AGGREGATED_FILE),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            cleaned_bookings: PathBuf::from(CLEANED_BOOKINGS_FILE),
            cleaned_aggregated: PathBuf::from(CLEANED_AGGREGATED_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    /// Gzip-compress the exported CSVs (a `.gz` suffix is appended).
    pub gzip: bool,
    /// Where to write the JSON insights report, if anywhere.
    pub report: Option<PathBuf>,
    /// Number of raw booking rows logged during exploration.
    pub sample_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            outputs: OutputPaths::default(),
            gzip: false,
            report: None,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}
