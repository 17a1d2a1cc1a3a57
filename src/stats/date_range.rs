//! Inclusive date ranges taken from `from` and `to` query parameters.

use serde::Deserialize;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::Error;

/// The raw `from` and `to` query parameters.
///
/// Kept as strings so that missing and malformed dates produce a descriptive error
/// rather than the extractor's generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// The first date to include.
    pub from: Option<String>,
    /// The last date to include.
    pub to: Option<String>,
}

/// A range of calendar dates where `from` is never after `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: Date,
    to: Date,
}

impl DateRange {
    /// Create a range covering `from` to `to`, both inclusive.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `from` comes after `to`.
    pub fn new(from: Date, to: Date) -> Result<Self, Error> {
        if from > to {
            return Err(Error::InvalidDateRange { from, to });
        }

        Ok(Self { from, to })
    }

    /// The first date in the range.
    pub fn from(&self) -> Date {
        self.from
    }

    /// The last date in the range.
    pub fn to(&self) -> Date {
        self.to
    }
}

impl TryFrom<DateRangeQuery> for DateRange {
    type Error = Error;

    fn try_from(query: DateRangeQuery) -> Result<Self, Self::Error> {
        let from = required_date("from", query.from.as_deref())?;
        let to = required_date("to", query.to.as_deref())?;

        DateRange::new(from, to)
    }
}

fn required_date(name: &str, raw: Option<&str>) -> Result<Date, Error> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(name, raw),
        _ => Err(Error::InvalidQuery(format!(
            "missing query parameter \"{name}\""
        ))),
    }
}

/// Parse the date named `name` from either a calendar date ("2024-03-01") or an
/// RFC 3339 date time ("2024-03-01T09:30:00Z"), in which case the time is dropped.
///
/// # Errors
/// Returns [Error::InvalidQuery] if `raw` is neither.
pub fn parse_date(name: &str, raw: &str) -> Result<Date, Error> {
    let raw = raw.trim();

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| {
            Error::InvalidQuery(format!(
                "invalid {name} date \"{raw}\", expected an ISO 8601 date such as 2024-03-01"
            ))
        })
}
