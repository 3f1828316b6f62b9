//! Partial-date handling.
//!
//! Request bounds are either a bare year or `DD/MM/YYYY`. Stored records keep
//! `year`, `month` and `day` as independent optional parts, so they are turned
//! into comparable dates differently depending on the use: range filtering
//! widens a partial date to cover its whole span, while date sorting only
//! trusts complete dates and pushes everything else behind a sentinel.

use chrono::{Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SearchError;

lazy_static! {
    static ref YEAR_ONLY: Regex = Regex::new(r"^[0-9]{4}$").expect("valid regex");
}

/// Sentinel year for undated records when sorting newest first.
pub const DESCENDING_SENTINEL_YEAR: i32 = 1111;
/// Sentinel year for undated records when sorting oldest first.
pub const ASCENDING_SENTINEL_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

impl Bound {
    pub fn param(self) -> &'static str {
        match self {
            Bound::Start => "startDate",
            Bound::End => "endDate",
        }
    }

    /// Month and day assumed for a stored record that lacks them.
    pub fn default_month_day(self) -> (i32, i32) {
        match self {
            Bound::Start => (1, 1),
            Bound::End => (12, 31),
        }
    }
}

/// Parses a request bound. A bare year expands to the first or last day of
/// that year depending on `bound`.
pub fn parse_bound(raw: &str, bound: Bound) -> Result<NaiveDate, SearchError> {
    let raw = raw.trim();
    let expanded = if YEAR_ONLY.is_match(raw) {
        match bound {
            Bound::Start => format!("01/01/{raw}"),
            Bound::End => format!("31/12/{raw}"),
        }
    } else {
        raw.to_string()
    };
    NaiveDate::parse_from_str(&expanded, "%d/%m/%Y").map_err(|_| SearchError::InvalidDateFormat {
        param: bound.param(),
        value: raw.to_string(),
    })
}

/// Builds a date the way the store's `$dateFromParts` does: a month or day
/// past the end of its range carries into the next unit.
pub fn date_from_parts(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(Duration::days(i64::from(day) - 1))
}

/// Effective date of a stored partial date when compared against `bound`.
/// Records without a year have none.
pub fn bound_date(year: Option<i32>, month: Option<i32>, day: Option<i32>, bound: Bound) -> Option<NaiveDate> {
    let (default_month, default_day) = bound.default_month_day();
    date_from_parts(year?, month.unwrap_or(default_month), day.unwrap_or(default_day))
}

/// Date used for chronological sorting. Only complete dates qualify.
pub fn full_date(year: Option<i32>, month: Option<i32>, day: Option<i32>) -> Option<NaiveDate> {
    date_from_parts(year?, month?, day?)
}

/// Last day of the sentinel year, standing in for "no date" in sorts.
pub fn sentinel_date(year: i32) -> Option<NaiveDate> {
    date_from_parts(year, 12, 31)
}
