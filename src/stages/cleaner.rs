//! Row filtering and missing-value imputation for the bookings table.

use tracing::{debug, info};

use crate::stages::types::{BookingRecord, CleaningReport};
use crate::stages::utility::{format_number, mean, median, sample_stddev};
use crate::table::Table;

/// Keeps bookings with a positive guest count. Missing counts are dropped.
pub fn filter_guests(bookings: Table<BookingRecord>) -> Table<BookingRecord> {
    bookings.retain(|b| b.no_guests.is_some_and(|n| n > 0.0))
}

/// `mean + 3 * stddev` of `revenue_generated`, skipping missing and
/// non-finite values.
///
/// Returns `None` when fewer than two revenues are present, since the sample
/// standard deviation is undefined there.
pub fn revenue_limit(bookings: &Table<BookingRecord>) -> Option<f64> {
    let revenues: Vec<f64> = bookings
        .records()
        .filter_map(|b| b.revenue_generated)
        .filter(|r| r.is_finite())
        .collect();

    let avg = mean(&revenues)?;
    let sd = sample_stddev(&revenues, avg)?;
    Some(avg + 3.0 * sd)
}

/// Keeps bookings whose revenue does not exceed `limit`. Without a limit the
/// table is returned unchanged.
pub fn filter_revenue_outliers(
    bookings: Table<BookingRecord>,
    limit: Option<f64>,
) -> Table<BookingRecord> {
    match limit {
        Some(limit) => bookings.retain(|b| b.revenue_generated.is_some_and(|r| r <= limit)),
        None => bookings,
    }
}

/// Fills every missing rating with the median of the present ratings and
/// writes every rating cell in float form, so the exported column is uniform.
///
/// Returns the imputed table, the median used and how many cells were filled.
pub fn impute_rating(
    mut bookings: Table<BookingRecord>,
) -> (Table<BookingRecord>, Option<f64>, usize) {
    let ratings: Vec<f64> = bookings.records().filter_map(|b| b.rating).collect();
    let fill = median(&ratings);

    let Some(column) = bookings.column_index("rating") else {
        return (bookings, fill, 0);
    };

    let mut imputed = 0;
    for row in bookings.rows_mut() {
        let rating = match (row.record.rating, fill) {
            (Some(rating), _) => rating,
            (None, Some(fill)) => {
                row.record.rating = Some(fill);
                imputed += 1;
                fill
            }
            (None, None) => continue,
        };
        row.set_cell(column, &format_number(rating));
    }

    (bookings, fill, imputed)
}

/// Runs the guest filter, the revenue outlier filter and rating imputation, in
/// that order, each over the output of the previous step.
#[tracing::instrument(skip_all, fields(rows = bookings.len()))]
pub fn clean_bookings(bookings: Table<BookingRecord>) -> (Table<BookingRecord>, CleaningReport) {
    let rows_loaded = bookings.len();

    let bookings = filter_guests(bookings);
    let rows_after_guest_filter = bookings.len();
    debug!(
        dropped = rows_loaded - rows_after_guest_filter,
        "Guest filter applied"
    );

    let limit = revenue_limit(&bookings);
    let bookings = filter_revenue_outliers(bookings, limit);
    let rows_after_revenue_filter = bookings.len();
    debug!(
        revenue_limit = ?limit,
        dropped = rows_after_guest_filter - rows_after_revenue_filter,
        "Revenue outlier filter applied"
    );

    let (bookings, rating_median, ratings_imputed) = impute_rating(bookings);

    let report = CleaningReport {
        rows_loaded,
        rows_after_guest_filter,
        rows_after_revenue_filter,
        revenue_limit: limit,
        rating_median,
        ratings_imputed,
    };

    info!(
        rows_loaded,
        rows_kept = rows_after_revenue_filter,
        rating_median = ?rating_median,
        ratings_imputed,
        "Bookings cleaned"
    );

    (bookings, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const HEADER: &str = "booking_id,property_id,booking_date,room_category,no_guests,\
                          revenue_generated,revenue_realized,booking_platform,rating";

    fn bookings(rows: &[&str]) -> Table<BookingRecord> {
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        Table::from_reader(csv.as_bytes(), Path::new("fact_bookings.csv")).unwrap()
    }

    fn scenario() -> Table<BookingRecord> {
        bookings(&[
            "B1,16558,2022-05-01,RT1,2,100,100,direct online,4",
            "B2,16558,2022-05-01,RT1,0,50,50,others,",
            "B3,16559,2022-05-02,RT2,3,100000,90000,makeyourtrip,",
        ])
    }

    #[test]
    fn test_filter_guests_drops_non_positive_and_missing() {
        let table = bookings(&[
            "B1,1,d,RT1,2,10,10,p,5",
            "B2,1,d,RT1,0,10,10,p,5",
            "B3,1,d,RT1,-1,10,10,p,5",
            "B4,1,d,RT1,,10,10,p,5",
        ]);
        let filtered = filter_guests(table);

        assert_eq!(filtered.len(), 1);
        assert!(filtered.records().all(|b| b.no_guests.unwrap() > 0.0));
    }

    #[test]
    fn test_filter_guests_is_idempotent() {
        let once = filter_guests(scenario());
        let twice = filter_guests(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_revenue_limit_on_guest_filtered_rows() {
        let filtered = filter_guests(scenario());
        let limit = revenue_limit(&filtered).unwrap();

        // mean 50050, sample stddev 49950 * sqrt(2)
        let expected = 50050.0 + 3.0 * 49950.0 * 2f64.sqrt();
        assert!((limit - expected).abs() < 1e-6);
    }

    #[test]
    fn test_filter_guests_accepts_float_counts() {
        let table = bookings(&["B1,1,d,RT1,2.0,10,10,p,5", "B2,1,d,RT1,0.0,10,10,p,5"]);
        let filtered = filter_guests(table);

        assert_eq!(filtered.len(), 1);
        assert_eq!(&filtered.rows()[0].raw[0], "B1");
    }

    #[test]
    fn test_revenue_limit_skips_nan_revenue() {
        let table = bookings(&[
            "B1,1,d,RT1,2,NaN,10,p,5",
            "B2,1,d,RT1,2,10,10,p,5",
            "B3,1,d,RT1,2,12,10,p,5",
        ]);
        let limit = revenue_limit(&table).unwrap();
        assert!(limit.is_finite());

        let kept = filter_revenue_outliers(table, Some(limit));
        let ids: Vec<&str> = kept.rows().iter().map(|r| &r.raw[0]).collect();
        assert_eq!(ids, vec!["B2", "B3"]);
    }

    #[test]
    fn test_revenue_limit_ignores_infinite_revenue() {
        let table = bookings(&[
            "B1,1,d,RT1,2,inf,10,p,5",
            "B2,1,d,RT1,2,10,10,p,5",
            "B3,1,d,RT1,2,12,10,p,5",
        ]);
        let limit = revenue_limit(&table).unwrap();
        assert!(limit.is_finite());
        assert_eq!(filter_revenue_outliers(table, Some(limit)).len(), 2);
    }

    #[test]
    fn test_impute_rating_na_token() {
        let table = bookings(&["B1,1,d,RT1,2,10,10,p,4", "B2,1,d,RT1,2,10,10,p,NA"]);
        let (imputed, fill, count) = impute_rating(table);

        assert_eq!(fill, Some(4.0));
        assert_eq!(count, 1);
        assert_eq!(&imputed.rows()[1].raw[8], "4.0");
    }

    #[test]
    fn test_revenue_limit_undefined_for_single_row() {
        let table = bookings(&["B1,1,d,RT1,2,10,10,p,5"]);
        assert_eq!(revenue_limit(&table), None);
        assert_eq!(filter_revenue_outliers(table, None).len(), 1);
    }

    #[test]
    fn test_filter_revenue_outliers_drops_above_limit() {
        let mut rows = vec!["B0,1,d,RT1,2,1000000,10,p,5".to_string()];
        rows.extend((1..=20).map(|i| format!("B{i},1,d,RT1,2,100,10,p,5")));
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let table = bookings(&refs);

        let limit = revenue_limit(&table);
        let filtered = filter_revenue_outliers(table, limit);

        assert_eq!(filtered.len(), 20);
        assert!(filtered.records().all(|b| b.revenue_generated == Some(100.0)));
    }

    #[test]
    fn test_impute_rating_uses_post_filter_median() {
        let table = bookings(&[
            "B1,1,d,RT1,2,10,10,p,3",
            "B2,1,d,RT1,2,10,10,p,",
            "B3,1,d,RT1,2,10,10,p,4",
        ]);
        let (imputed, fill, count) = impute_rating(table);

        assert_eq!(fill, Some(3.5));
        assert_eq!(count, 1);
        assert_eq!(imputed.rows()[1].record.rating, Some(3.5));
        assert_eq!(&imputed.rows()[1].raw[8], "3.5");
        assert_eq!(&imputed.rows()[0].raw[8], "3.0");
        assert!(imputed.records().all(|b| b.rating.is_some()));
    }

    #[test]
    fn test_impute_rating_all_missing_leaves_table() {
        let table = bookings(&["B1,1,d,RT1,2,10,10,p,"]);
        let (imputed, fill, count) = impute_rating(table);

        assert_eq!(fill, None);
        assert_eq!(count, 0);
        assert_eq!(imputed.rows()[0].record.rating, None);
    }

    #[test]
    fn test_clean_bookings_scenario() {
        let (cleaned, report) = clean_bookings(scenario());

        assert_eq!(report.rows_loaded, 3);
        assert_eq!(report.rows_after_guest_filter, 2);
        assert_eq!(report.rows_after_revenue_filter, 2);
        assert_eq!(report.rating_median, Some(4.0));
        assert_eq!(report.ratings_imputed, 1);

        let ids: Vec<&str> = cleaned.rows().iter().map(|r| &r.raw[0]).collect();
        assert_eq!(ids, vec!["B1", "B3"]);
        assert_eq!(&cleaned.rows()[1].raw[8], "4.0");
    }

    #[test]
    fn test_clean_bookings_empty_is_valid() {
        let table = bookings(&["B1,1,d,RT1,0,10,10,p,5"]);
        let (cleaned, report) = clean_bookings(table);

        assert!(cleaned.is_empty());
        assert_eq!(report.revenue_limit, None);
        assert_eq!(report.rating_median, None);
    }
}
