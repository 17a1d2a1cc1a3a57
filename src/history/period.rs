//! Resolves a history request into the buckets it should produce.

use std::ops::RangeInclusive;

use serde::Deserialize;
use time::Month;

use crate::Error;

/// The earliest year history can be requested for.
pub const MIN_YEAR: i32 = 2000;
/// The latest year history can be requested for.
pub const MAX_YEAR: i32 = 3000;

/// The raw query parameters of a history request.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Either "year" for monthly buckets or "month" for daily buckets.
    pub timeframe: Option<String>,
    /// The calendar year, e.g. "2024".
    pub year: Option<String>,
    /// The zero-based month, e.g. "0" for January. Required for the "month" timeframe.
    pub month: Option<String>,
}

/// Which buckets a history series is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPlan {
    /// One bucket per month of `year`, indexed 0 to 11.
    Yearly {
        /// The calendar year.
        year: i32,
    },
    /// One bucket per day of `month` in `year`, indexed from 1 to the length of the month.
    ///
    /// Months past 11 are treated as December.
    Monthly {
        /// The calendar year.
        year: i32,
        /// The zero-based month.
        month: u8,
    },
}

impl HistoryPlan {
    /// The index of every bucket in the plan, in order.
    pub fn bucket_range(&self) -> RangeInclusive<u8> {
        match *self {
            HistoryPlan::Yearly { .. } => 0..=11,
            HistoryPlan::Monthly { year, month } => 1..=days_in_month(year, month),
        }
    }

    /// The year the plan covers.
    pub fn year(&self) -> i32 {
        match *self {
            HistoryPlan::Yearly { year } | HistoryPlan::Monthly { year, .. } => year,
        }
    }
}

fn days_in_month(year: i32, month: u8) -> u8 {
    Month::try_from(month.saturating_add(1))
        .unwrap_or(Month::December)
        .length(year)
}

impl TryFrom<HistoryQuery> for HistoryPlan {
    type Error = Error;

    fn try_from(query: HistoryQuery) -> Result<Self, Self::Error> {
        let timeframe = non_empty(query.timeframe.as_deref()).ok_or_else(|| {
            Error::InvalidQuery("missing query parameter \"timeframe\"".to_owned())
        })?;
        let year = non_empty(query.year.as_deref())
            .ok_or_else(|| Error::InvalidQuery("missing query parameter \"year\"".to_owned()))
            .and_then(parse_year)?;
        let month = non_empty(query.month.as_deref()).map(parse_month).transpose()?;

        match timeframe {
            "year" => Ok(HistoryPlan::Yearly { year }),
            "month" => {
                let month = month.ok_or_else(|| {
                    Error::InvalidQuery(
                        "the \"month\" timeframe requires the query parameter \"month\""
                            .to_owned(),
                    )
                })?;

                Ok(HistoryPlan::Monthly { year, month })
            }
            other => Err(Error::InvalidQuery(format!(
                "invalid timeframe \"{other}\", expected \"month\" or \"year\""
            ))),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|raw| !raw.is_empty())
}

fn parse_year(raw: &str) -> Result<i32, Error> {
    raw.parse::<i32>()
        .ok()
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .ok_or_else(|| {
            Error::InvalidQuery(format!(
                "invalid year \"{raw}\", expected a year between {MIN_YEAR} and {MAX_YEAR}"
            ))
        })
}

fn parse_month(raw: &str) -> Result<u8, Error> {
    raw.parse::<u8>()
        .ok()
        .filter(|month| *month <= 11)
        .ok_or_else(|| {
            Error::InvalidQuery(format!(
                "invalid month \"{raw}\", expected a month between 0 and 11"
            ))
        })
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        history::{HistoryPlan, HistoryQuery},
    };

    fn resolve(timeframe: &str, year: &str, month: Option<&str>) -> Result<HistoryPlan, Error> {
        HistoryPlan::try_from(HistoryQuery {
            timeframe: Some(timeframe.to_owned()),
            year: Some(year.to_owned()),
            month: month.map(str::to_owned),
        })
    }

    #[test]
    fn resolves_yearly_plan() {
        assert_eq!(
            resolve("year", "2024", None),
            Ok(HistoryPlan::Yearly { year: 2024 })
        );
        assert_eq!(resolve("year", "2024", None).unwrap().bucket_range(), 0..=11);
    }

    #[test]
    fn resolves_monthly_plan() {
        assert_eq!(
            resolve("month", "2024", Some("1")),
            Ok(HistoryPlan::Monthly {
                year: 2024,
                month: 1
            })
        );
    }

    #[test]
    fn month_lengths_follow_calendar() {
        let cases = [
            (2024, 1, 29),
            (2023, 1, 28),
            (2000, 1, 29),
            (2100, 1, 28),
            (2024, 0, 31),
            (2024, 3, 30),
            (2024, 11, 31),
        ];

        for (year, month, want) in cases {
            let range = HistoryPlan::Monthly { year, month }.bucket_range();
            assert_eq!(range, 1..=want, "{year}-{month}");
        }
    }

    #[test]
    fn month_past_december_is_never_empty() {
        for month in [12, u8::MAX] {
            let range = HistoryPlan::Monthly { year: 2024, month }.bucket_range();
            assert_eq!(range, 1..=31, "month {month}");
        }
    }

    #[test]
    fn month_is_required_for_month_timeframe() {
        assert!(matches!(
            resolve("month", "2024", None),
            Err(Error::InvalidQuery(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for (timeframe, year, month) in [
            ("year", "1999", None),
            ("year", "3001", None),
            ("year", "twenty", None),
            ("month", "2024", Some("12")),
            ("month", "2024", Some("-1")),
            ("week", "2024", None),
        ] {
            assert!(
                matches!(resolve(timeframe, year, month), Err(Error::InvalidQuery(_))),
                "{timeframe} {year} {month:?} should be rejected"
            );
        }
    }

    #[test]
    fn missing_year_is_rejected() {
        let result = HistoryPlan::try_from(HistoryQuery {
            timeframe: Some("year".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            result,
            Err(Error::InvalidQuery(
                "missing query parameter \"year\"".to_owned()
            ))
        );
    }

    #[test]
    fn resolves_from_query_string() {
        let query: HistoryQuery =
            serde_urlencoded::from_str("timeframe=month&year=2023&month=11").unwrap();

        assert_eq!(
            HistoryPlan::try_from(query),
            Ok(HistoryPlan::Monthly {
                year: 2023,
                month: 11
            })
        );
    }
}
