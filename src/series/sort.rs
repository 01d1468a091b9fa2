//! Chronological ordering and simple series queries.

use rust_decimal::prelude::ToPrimitive;

use crate::domain::{CalendarDate, NavRecord, SeriesPoint};

/// Stable ascending sort by parsed date.
///
/// Records sharing a date keep their relative input order. The input is not modified.
pub fn sort_ascending(records: &[NavRecord]) -> Vec<NavRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.day());
    sorted
}

/// Records with `from <= date <= to`; either bound may be open.
pub fn filter_range(
    records: &[NavRecord],
    from: Option<CalendarDate>,
    to: Option<CalendarDate>,
) -> Vec<NavRecord> {
    records
        .iter()
        .filter(|r| from.is_none_or(|f| r.day() >= f) && to.is_none_or(|t| r.day() <= t))
        .cloned()
        .collect()
}

/// The most recent record; among equal dates, the one appearing last.
pub fn latest(records: &[NavRecord]) -> Option<&NavRecord> {
    records.iter().max_by_key(|r| r.day())
}

/// Chart-ready `{date, nav}` points, in the order given.
pub fn chart_points(records: &[NavRecord]) -> Vec<SeriesPoint> {
    records
        .iter()
        .map(|r| SeriesPoint {
            date: r.date().to_string(),
            nav: r.nav().to_f64().unwrap_or(f64::NAN),
        })
        .collect()
}
