//! Grouped summary statistics over the cleaned tables.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::stages::types::{
    BookingRecord, GroupStat, HotelRecord, Insights, RoomOccupancyRecord,
};
use crate::stages::utility::mean;
use crate::table::Table;

/// Mean of the present values per key, ordered by key. A group whose values
/// are all missing has a mean of `None`.
pub fn grouped_mean<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>,
) -> Vec<GroupStat> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (key, value) in pairs {
        let series = groups.entry(key).or_default();
        if let Some(value) = value {
            series.push(value);
        }
    }

    groups
        .into_iter()
        .map(|(key, series)| GroupStat {
            key: key.to_string(),
            value: mean(&series),
        })
        .collect()
}

/// Sum of the present values per key, ordered by key. Empty groups sum to zero.
pub fn grouped_sum<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>,
) -> Vec<GroupStat> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for (key, value) in pairs {
        *groups.entry(key).or_default() += value.unwrap_or(0.0);
    }

    groups
        .into_iter()
        .map(|(key, total)| GroupStat {
            key: key.to_string(),
            value: Some(total),
        })
        .collect()
}

fn compare_values(a: &GroupStat, b: &GroupStat) -> Ordering {
    match (a.value, b.value) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts by value ascending, missing values last. Equal values keep their order.
pub fn sort_ascending(mut stats: Vec<GroupStat>) -> Vec<GroupStat> {
    stats.sort_by(compare_values);
    stats
}

/// Sorts by value descending, missing values last. Equal values keep their order.
pub fn sort_descending(mut stats: Vec<GroupStat>) -> Vec<GroupStat> {
    stats.sort_by(|a, b| match (a.value, b.value) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => compare_values(a, b),
    });
    stats
}

fn hotels_by_property(hotels: &Table<HotelRecord>) -> HashMap<&str, Vec<&HotelRecord>> {
    let mut index: HashMap<&str, Vec<&HotelRecord>> = HashMap::new();
    for hotel in hotels.records() {
        index.entry(hotel.property_id.as_str()).or_default().push(hotel);
    }
    index
}

/// Mean occupancy per room class, ascending by value.
pub fn occupancy_by_room_class(aggregated: &Table<RoomOccupancyRecord>) -> Vec<GroupStat> {
    sort_ascending(grouped_mean(
        aggregated
            .records()
            .map(|r| (r.room_class.as_str(), r.occ_pct)),
    ))
}

/// Mean occupancy per city, inner-joining hotels on `property_id`.
pub fn occupancy_by_city(
    hotels: &Table<HotelRecord>,
    aggregated: &Table<RoomOccupancyRecord>,
) -> Vec<GroupStat> {
    let index = hotels_by_property(hotels);
    grouped_mean(aggregated.records().flat_map(|r| {
        index
            .get(r.property_id.as_str())
            .into_iter()
            .flatten()
            .map(move |hotel| (hotel.city.as_str(), r.occ_pct))
    }))
}

/// Total realized revenue per city, inner-joining hotels on `property_id`.
pub fn revenue_by_city(
    hotels: &Table<HotelRecord>,
    bookings: &Table<BookingRecord>,
) -> Vec<GroupStat> {
    let index = hotels_by_property(hotels);
    grouped_sum(bookings.records().flat_map(|b| {
        index
            .get(b.property_id.as_str())
            .into_iter()
            .flatten()
            .map(move |hotel| (hotel.city.as_str(), b.revenue_realized))
    }))
}

/// Runs the three reductions over the cleaned and transformed tables.
#[tracing::instrument(skip_all)]
pub fn aggregate(
    hotels: &Table<HotelRecord>,
    bookings: &Table<BookingRecord>,
    aggregated: &Table<RoomOccupancyRecord>,
) -> Insights {
    let revenue = revenue_by_city(hotels, bookings);
    let insights = Insights {
        room_occupancy: occupancy_by_room_class(aggregated),
        city_occupancy: occupancy_by_city(hotels, aggregated),
        revenue_by_city_ranked: sort_descending(revenue.clone()),
        revenue_by_city: revenue,
    };

    info!(
        room_classes = insights.room_occupancy.len(),
        cities = insights.city_occupancy.len(),
        "Insights aggregated"
    );

    insights
}
