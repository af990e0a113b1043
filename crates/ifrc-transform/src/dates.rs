//! Lenient parsing of the provider's date and timestamp strings.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use ifrc_model::YearMonth;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses an ISO 8601 date or timestamp; values without an offset are UTC.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(value) = DateTime::parse_from_str(raw, format) {
            return Some(value.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(value.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

/// Calendar date part of [`parse_datetime`].
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_datetime(raw).map(|value| value.date_naive())
}

#[must_use]
pub fn year_month_of(date: NaiveDate) -> YearMonth {
    YearMonth::new(date.year(), date.month())
}
