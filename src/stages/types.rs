//! Typed views over the rows of each dataset.

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::table::RequiredColumns;

/// Cell values read as a missing number, in addition to the empty cell.
const MISSING_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "#N/A", "#N/A N/A", "#NA", "<NA>", "NaN", "-NaN", "nan", "-nan",
    "null", "NULL", "None", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Parses a numeric cell, treating empty cells and the usual NA spellings as
/// missing. Integers and floats are both accepted.
pub fn missing_or_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell: Option<String> = Option::deserialize(deserializer)?;
    match cell.as_deref().map(str::trim) {
        None => Ok(None),
        Some(cell) if is_missing(cell) => Ok(None),
        Some(cell) => cell
            .parse::<f64>()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid number '{cell}': {e}"))),
    }
}

/// A single booking transaction from `fact_bookings`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingRecord {
    pub property_id: String,
    pub booking_date: String,
    pub room_category: String,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub no_guests: Option<f64>,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub revenue_generated: Option<f64>,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub revenue_realized: Option<f64>,
    pub booking_platform: String,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub rating: Option<f64>,
}

impl RequiredColumns for BookingRecord {
    const REQUIRED: &'static [&'static str] = &[
        "property_id",
        "booking_date",
        "room_category",
        "no_guests",
        "revenue_generated",
        "revenue_realized",
        "booking_platform",
        "rating",
    ];
}

/// One property / room category / date row from `fact_aggregated_bookings`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregatedBookingRecord {
    pub property_id: String,
    pub room_category: String,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub capacity: Option<f64>,
    #[serde(default, deserialize_with = "missing_or_f64")]
    pub successful_bookings: Option<f64>,
}

impl RequiredColumns for AggregatedBookingRecord {
    const REQUIRED: &'static [&'static str] = &[
        "property_id",
        "room_category",
        "capacity",
        "successful_bookings",
    ];
}

/// An aggregated booking row with its derived occupancy percentage.
///
/// `occ_pct` is `None` when capacity is zero or either input is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyRecord {
    pub property_id: String,
    pub room_category: String,
    pub occ_pct: Option<f64>,
}

/// An occupancy row enriched with the room class of its category.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOccupancyRecord {
    pub property_id: String,
    pub room_category: String,
    pub occ_pct: Option<f64>,
    pub room_class: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomRecord {
    pub room_id: String,
    pub room_class: String,
}

impl RequiredColumns for RoomRecord {
    const REQUIRED: &'static [&'static str] = &["room_id", "room_class"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HotelRecord {
    pub property_id: String,
    pub city: String,
}

impl RequiredColumns for HotelRecord {
    const REQUIRED: &'static [&'static str] = &["property_id", "city"];
}

/// A row of `dim_date`. Only the `date` column is read, and only for reporting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateRecord {
    pub date: Option<String>,
}

impl RequiredColumns for DateRecord {
    const REQUIRED: &'static [&'static str] = &[];
}

/// Mean or sum of one group in a grouped reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub key: String,
    pub value: Option<f64>,
}

/// Row counts before and after each cleaning step, with the derived thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    pub rows_after_guest_filter: usize,
    pub rows_after_revenue_filter: usize,
    pub revenue_limit: Option<f64>,
    pub rating_median: Option<f64>,
    pub ratings_imputed: usize,
}

/// The grouped summaries produced by the aggregation stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    /// Mean occupancy per room class, ascending by value.
    pub room_occupancy: Vec<GroupStat>,
    /// Mean occupancy per city, ordered by city.
    pub city_occupancy: Vec<GroupStat>,
    /// Realized revenue per city, ordered by city.
    pub revenue_by_city: Vec<GroupStat>,
    /// Realized revenue per city, highest first.
    pub revenue_by_city_ranked: Vec<GroupStat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use std::path::Path;

    fn booking(row: &str) -> BookingRecord {
        let csv = format!(
            "property_id,booking_date,room_category,no_guests,revenue_generated,\
             revenue_realized,booking_platform,rating\n{row}\n"
        );
        let table: Table<BookingRecord> =
            Table::from_reader(csv.as_bytes(), Path::new("fact_bookings.csv")).unwrap();
        table.rows()[0].record.clone()
    }

    #[test]
    fn test_float_guest_count() {
        assert_eq!(booking("1,d,RT1,2.0,10,10,p,4").no_guests, Some(2.0));
    }

    #[test]
    fn test_na_tokens_are_missing() {
        let record = booking("1,d,RT1,NA,NaN,null,p,N/A");
        assert_eq!(record.no_guests, None);
        assert_eq!(record.revenue_generated, None);
        assert_eq!(record.revenue_realized, None);
        assert_eq!(record.rating, None);
    }

    #[test]
    fn test_invalid_number_still_fails() {
        let csv = "property_id,booking_date,room_category,no_guests,revenue_generated,\
                   revenue_realized,booking_platform,rating\n1,d,RT1,two,10,10,p,4\n";
        let result: crate::error::Result<Table<BookingRecord>> =
            Table::from_reader(csv.as_bytes(), Path::new("fact_bookings.csv"));
        assert!(result.is_err());
    }
}
