//! Reads the five input datasets into memory.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::InputPaths;
use crate::error::{PipelineError, Result};
use crate::stages::types::{
    AggregatedBookingRecord, BookingRecord, DateRecord, HotelRecord, RoomRecord,
};
use crate::table::{RequiredColumns, Table};

/// Every table a pipeline run starts from.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub bookings: Table<BookingRecord>,
    pub dates: Table<DateRecord>,
    pub hotels: Table<HotelRecord>,
    pub rooms: Table<RoomRecord>,
    pub aggregated_bookings: Table<AggregatedBookingRecord>,
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })?;

    let reader = BufReader::new(file);
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Loads one CSV file (optionally gzipped) into a typed table.
pub fn load_table<T>(path: &Path) -> Result<Table<T>>
where
    T: DeserializeOwned + RequiredColumns,
{
    let table = Table::from_reader(open(path)?, path)?;
    debug!(path = %path.display(), rows = table.len(), "Table loaded");
    Ok(table)
}

/// Loads all five datasets. The first failure aborts the load.
#[tracing::instrument(skip_all)]
pub fn load_datasets(paths: &InputPaths) -> Result<Datasets> {
    let datasets = Datasets {
        bookings: load_table(&paths.bookings)?,
        dates: load_table(&paths.dates)?,
        hotels: load_table(&paths.hotels)?,
        rooms: load_table(&paths.rooms)?,
        aggregated_bookings: load_table(&paths.aggregated_bookings)?,
    };

    info!(
        bookings = datasets.bookings.len(),
        dates = datasets.dates.len(),
        hotels = datasets.hotels.len(),
        rooms = datasets.rooms.len(),
        aggregated_bookings = datasets.aggregated_bookings.len(),
        "Datasets loaded"
    );

    Ok(datasets)
}
