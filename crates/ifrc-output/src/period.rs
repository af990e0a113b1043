//! Dataset date range derived from row start and end dates.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use ifrc_model::Row;
use ifrc_model::row::text_field;
use ifrc_transform::dates::parse_date;

/// Dates in or before this year are treated as placeholders.
pub const IMPLAUSIBLE_YEAR: i32 = 1900;

/// The usable bounds of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowBounds {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Reads `start_date`/`end_date` from a row, warning about rejected values.
#[must_use]
pub fn row_bounds(row: &Row) -> RowBounds {
    let start = text_field(row, "start_date").and_then(parse_date);
    let end = text_field(row, "end_date").and_then(parse_date);

    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        warn!(row = %row_identifier(row), %start, %end, "end date before start date");
        return RowBounds::default();
    }

    let plausible = |date: NaiveDate, which: &str| {
        if date.year() > IMPLAUSIBLE_YEAR {
            Some(date)
        } else {
            warn!(row = %row_identifier(row), %date, "{which} date year <= {IMPLAUSIBLE_YEAR}");
            None
        }
    };
    RowBounds {
        start: start.and_then(|date| plausible(date, "start")),
        end: end.and_then(|date| plausible(date, "end")),
    }
}

/// `{society} aid = {aid}` or `{society} country = {country name}`.
fn row_identifier(row: &Row) -> String {
    let society = text_field(row, "country.society_name").unwrap_or_default();
    match row.get("aid").map(ifrc_model::row::cell_text) {
        Some(aid) if !aid.is_empty() => format!("{society} aid = {aid}"),
        _ => format!(
            "{society} country = {}",
            text_field(row, "country.name").unwrap_or_default()
        ),
    }
}

/// Earliest start and latest end over a row set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    earliest_start: Option<NaiveDate>,
    latest_end: Option<NaiveDate>,
    latest_start: Option<NaiveDate>,
    earliest_end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut range = Self::default();
        for row in rows {
            range.include(row_bounds(row));
        }
        range
    }

    pub fn include(&mut self, bounds: RowBounds) {
        if let Some(start) = bounds.start {
            self.earliest_start = Some(self.earliest_start.map_or(start, |s| s.min(start)));
            self.latest_start = Some(self.latest_start.map_or(start, |s| s.max(start)));
        }
        if let Some(end) = bounds.end {
            self.latest_end = Some(self.latest_end.map_or(end, |e| e.max(end)));
            self.earliest_end = Some(self.earliest_end.map_or(end, |e| e.min(end)));
        }
    }

    /// Resolved `(start, end)`; a missing side falls back to the nearest
    /// date seen on the other side.
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.earliest_start, self.latest_end) {
            (Some(start), Some(end)) => Some((start, end.max(start))),
            (Some(start), None) => Some((start, self.latest_start.unwrap_or(start))),
            (None, Some(end)) => Some((self.earliest_end.unwrap_or(end), end)),
            (None, None) => None,
        }
    }

    /// `[YYYY-MM-DDT00:00:00 TO YYYY-MM-DDT23:59:59]`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.bounds().map(|(start, end)| {
            format!(
                "[{}T00:00:00 TO {}T23:59:59]",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )
        })
    }
}
