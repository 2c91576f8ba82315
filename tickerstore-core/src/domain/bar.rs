//! PriceBar: one stored trading day for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar plus corporate actions, keyed by (ticker, date).
///
/// A stored bar is always written whole: a refetch of the same date replaces
/// every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Cash dividend paid on this date, 0.0 when none.
    pub dividends: f64,
    /// Split ratio effective on this date (e.g. 4.0 for 4:1), 0.0 when none.
    pub splits: f64,
}

impl PriceBar {
    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    pub fn has_corporate_action(&self) -> bool {
        self.dividends != 0.0 || self.splits != 0.0
    }
}
