//! Calendar partitioning
//!
//! Derives the partition columns stored alongside every entry (date, ISO
//! week, month, day) from a single UTC instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

/// Calendar partition key of one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// UTC date, `YYYY-MM-DD`
    pub entry_date: String,
    /// Full UTC timestamp with millisecond precision
    pub entry_timestamp: String,
    pub year: i32,
    /// 1-based month
    pub month: u32,
    /// ISO-8601 week number (1..=53)
    pub week: u32,
    /// Day of month
    pub day: u32,
}

/// Compute the partition key for `instant`
pub fn partition(instant: DateTime<Utc>) -> Partition {
    let date = instant.date_naive();
    Partition {
        entry_date: date.format("%Y-%m-%d").to_string(),
        entry_timestamp: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        year: date.year(),
        month: date.month(),
        week: iso_week(date),
        day: date.day(),
    }
}

/// ISO-8601 week number of `date`
///
/// Shifts the date to the Thursday of its own week; the week number is the
/// ordinal of that Thursday within its year divided by seven, rounded up.
/// Dates near new year therefore take their number from the adjacent year.
pub fn iso_week(date: NaiveDate) -> u32 {
    let weekday_from_monday = i64::from(date.weekday().num_days_from_monday());
    let thursday = date + Duration::days(3 - weekday_from_monday);
    thursday.ordinal().div_ceil(7)
}
