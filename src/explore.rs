//! First look at the raw data before cleaning: a sample of bookings, the room
//! categories in use and how bookings spread across platforms.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::stages::types::{BookingRecord, DateRecord};
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformCount {
    pub platform: String,
    pub bookings: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplorationSummary {
    /// Room categories in order of first appearance.
    pub room_categories: Vec<String>,
    /// Bookings per platform, most frequent first.
    pub platform_distribution: Vec<PlatformCount>,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

/// Distinct values in order of first appearance.
pub fn unique_room_categories(bookings: &Table<BookingRecord>) -> Vec<String> {
    let mut seen = Vec::new();
    for booking in bookings.records() {
        if !seen.contains(&booking.room_category) {
            seen.push(booking.room_category.clone());
        }
    }
    seen
}

/// Booking counts per platform, most frequent first; ties by platform name.
pub fn platform_distribution(bookings: &Table<BookingRecord>) -> Vec<PlatformCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for booking in bookings.records() {
        *counts.entry(booking.booking_platform.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<PlatformCount> = counts
        .into_iter()
        .map(|(platform, bookings)| PlatformCount {
            platform: platform.to_string(),
            bookings,
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.bookings
            .cmp(&a.bookings)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    distribution
}

/// Logs the first `sample_rows` raw bookings and summarises the raw tables.
#[tracing::instrument(skip_all)]
pub fn explore(
    bookings: &Table<BookingRecord>,
    dates: &Table<DateRecord>,
    sample_rows: usize,
) -> ExplorationSummary {
    let headers: Vec<&str> = bookings.headers().iter().collect();
    for row in bookings.rows().iter().take(sample_rows) {
        let cells: Vec<&str> = row.raw.iter().collect();
        info!(columns = ?headers, values = ?cells, "Booking sample");
    }

    let summary = ExplorationSummary {
        room_categories: unique_room_categories(bookings),
        platform_distribution: platform_distribution(bookings),
        first_date: dates.records().find_map(|d| d.date.clone()),
        last_date: dates.rows().iter().rev().find_map(|r| r.record.date.clone()),
    };

    info!(room_categories = ?summary.room_categories, "Unique room categories");
    for entry in &summary.platform_distribution {
        info!(platform = %entry.platform, bookings = entry.bookings, "Booking platform");
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn bookings() -> Table<BookingRecord> {
        let csv = "property_id,booking_date,room_category,no_guests,revenue_generated,\
                   revenue_realized,booking_platform,rating\n\
                   1,d,RT2,2,10,10,others,\n\
                   1,d,RT1,2,10,10,logtrip,\n\
                   1,d,RT2,2,10,10,others,\n\
                   1,d,RT3,2,10,10,direct online,\n\
                   1,d,RT1,2,10,10,logtrip,\n\
                   1,d,RT1,2,10,10,others,\n";
        Table::from_reader(csv.as_bytes(), Path::new("fact_bookings.csv")).unwrap()
    }

    #[test]
    fn test_unique_room_categories_first_appearance() {
        assert_eq!(unique_room_categories(&bookings()), vec!["RT2", "RT1", "RT3"]);
    }

    #[test]
    fn test_platform_distribution_most_frequent_first() {
        let distribution = platform_distribution(&bookings());
        let pairs: Vec<(&str, usize)> = distribution
            .iter()
            .map(|p| (p.platform.as_str(), p.bookings))
            .collect();

        assert_eq!(
            pairs,
            vec![("others", 3), ("logtrip", 2), ("direct online", 1)]
        );
    }

    #[test]
    fn test_explore_reports_date_span() {
        let dates: Table<DateRecord> = Table::from_reader(
            "date,mmm yy,week no,day_type\n01-May-22,May 22,W 19,weekend\n31-Jul-22,Jul 22,W 32,weekeday\n"
                .as_bytes(),
            Path::new("dim_date.csv"),
        )
        .unwrap();

        let summary = explore(&bookings(), &dates, 2);
        assert_eq!(summary.first_date.as_deref(), Some("01-May-22"));
        assert_eq!(summary.last_date.as_deref(), Some("31-Jul-22"));
        assert_eq!(summary.platform_distribution.len(), 3);
    }
}
