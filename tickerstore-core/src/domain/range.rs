//! Half-open calendar date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Range of calendar days `[start, end)`: `end` itself is not covered.
///
/// Fetch windows use this shape so that a window ending today never
/// includes today's unfinished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Number of calendar days covered, 0 for an empty or inverted range.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} up to {}", self.start, self.end)
    }
}
