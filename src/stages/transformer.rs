//! Occupancy derivation and room-dimension enrichment of aggregated bookings.

use std::collections::HashMap;

use csv::StringRecord;
use tracing::{info, warn};

use crate::stages::types::{
    AggregatedBookingRecord, OccupancyRecord, RoomOccupancyRecord, RoomRecord,
};
use crate::stages::utility::{format_number, round2};
use crate::table::{Row, Table};

pub const OCC_PCT: &str = "occ_pct";
const ROOM_KEY: &str = "room_id";

/// `round(successful / capacity * 100, 2)`, or `None` when capacity is zero
/// or either input is missing.
pub fn occupancy_pct(successful_bookings: Option<f64>, capacity: Option<f64>) -> Option<f64> {
    match (successful_bookings, capacity) {
        (Some(successful), Some(capacity)) if capacity != 0.0 => {
            Some(round2(successful / capacity * 100.0))
        }
        _ => None,
    }
}

/// Adds the `occ_pct` column, overwriting it if the input already has one.
/// Rows with an undefined occupancy are kept with an empty cell.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn derive_occupancy(table: Table<AggregatedBookingRecord>) -> Table<OccupancyRecord> {
    let mut headers = table.headers().clone();
    let column = match table.column_index(OCC_PCT) {
        Some(index) => index,
        None => {
            headers.push_field(OCC_PCT);
            headers.len() - 1
        }
    };

    let mut undefined = 0;
    let rows: Vec<Row<OccupancyRecord>> = table
        .rows()
        .iter()
        .map(|row| {
            let occ_pct = occupancy_pct(row.record.successful_bookings, row.record.capacity);
            if occ_pct.is_none() {
                undefined += 1;
            }

            let mut out = Row {
                record: OccupancyRecord {
                    property_id: row.record.property_id.clone(),
                    room_category: row.record.room_category.clone(),
                    occ_pct,
                },
                raw: row.raw.clone(),
            };
            out.set_cell(column, &occ_pct.map(format_number).unwrap_or_default());
            out
        })
        .collect();

    if undefined > 0 {
        warn!(
            rows = undefined,
            "Occupancy undefined (zero or missing capacity); left empty"
        );
    }

    Table::new(headers, rows)
}

/// Inner-joins the room dimension on `room_category == room_id`.
///
/// Unmatched rows are dropped and duplicate room ids multiply rows. The
/// `room_id` column is removed from the result; the remaining room columns are
/// appended, with clashing names suffixed `_x` (left) and `_y` (right).
#[tracing::instrument(skip_all, fields(rows = table.len(), rooms = rooms.len()))]
pub fn join_rooms(
    table: Table<OccupancyRecord>,
    rooms: &Table<RoomRecord>,
) -> Table<RoomOccupancyRecord> {
    let room_columns: Vec<usize> = rooms
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, name)| *name != ROOM_KEY)
        .map(|(i, _)| i)
        .collect();
    let headers = joined_headers(
        table.headers(),
        room_columns.iter().map(|&i| &rooms.headers()[i]),
    );

    let mut by_id: HashMap<&str, Vec<&Row<RoomRecord>>> = HashMap::new();
    for room in rooms.rows() {
        by_id.entry(room.record.room_id.as_str()).or_default().push(room);
    }

    let mut rows = Vec::new();
    let mut unmatched = 0;
    for row in table.rows() {
        let Some(matches) = by_id.get(row.record.room_category.as_str()) else {
            unmatched += 1;
            continue;
        };
        for room in matches {
            let mut raw = row.raw.clone();
            for &i in &room_columns {
                raw.push_field(room.raw.get(i).unwrap_or_default());
            }
            rows.push(Row {
                record: RoomOccupancyRecord {
                    property_id: row.record.property_id.clone(),
                    room_category: row.record.room_category.clone(),
                    occ_pct: row.record.occ_pct,
                    room_class: room.record.room_class.clone(),
                },
                raw,
            });
        }
    }

    if unmatched > 0 {
        warn!(
            dropped = unmatched,
            "Aggregated rows without a matching room dropped"
        );
    }

    Table::new(headers, rows)
}

fn joined_headers<'a>(
    left: &StringRecord,
    right: impl Iterator<Item = &'a str> + Clone,
) -> StringRecord {
    let mut headers = StringRecord::new();
    for name in left.iter() {
        if right.clone().any(|r| r == name) {
            headers.push_field(&format!("{name}_x"));
        } else {
            headers.push_field(name);
        }
    }
    for name in right {
        if left.iter().any(|l| l == name) {
            headers.push_field(&format!("{name}_y"));
        } else {
            headers.push_field(name);
        }
    }
    headers
}

/// Derives occupancy and joins room classes.
pub fn transform_aggregated(
    table: Table<AggregatedBookingRecord>,
    rooms: &Table<RoomRecord>,
) -> Table<RoomOccupancyRecord> {
    let transformed = join_rooms(derive_occupancy(table), rooms);
    info!(rows = transformed.len(), "Aggregated bookings transformed");
    transformed
}
