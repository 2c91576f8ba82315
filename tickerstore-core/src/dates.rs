//! Date parsing for user-supplied input.
//!
//! Only the ISO `YYYY-MM-DD` form is accepted. Anything else is a
//! `DateError` returned to the caller; it is never logged and swallowed.

use chrono::{Months, NaiveDate};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed date '{input}': expected YYYY-MM-DD")]
    Malformed { input: String },

    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Parse a `YYYY-MM-DD` date. Surrounding whitespace is ignored.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| DateError::Malformed {
        input: input.to_string(),
    })
}

/// Parse an optional date argument.
pub fn parse_optional(input: Option<&str>) -> Result<Option<NaiveDate>, DateError> {
    input.map(parse_date).transpose()
}

/// Reject `start > end` when both bounds are present.
pub fn check_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), DateError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(DateError::Inverted { start, end }),
        _ => Ok(()),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `date` shifted back by whole years, clamping Feb 29 to Feb 28.
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}
