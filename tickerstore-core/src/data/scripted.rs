//! In-memory provider serving canned bars and news.
//!
//! Test support only: compiled for this crate's tests and behind the
//! `test-util` feature for downstream tests. Every call is recorded so
//! callers can check which windows were requested.

use super::provider::{DataProvider, ProviderError, RawBar, RawNewsItem};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Bars {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    News {
        symbol: String,
        count: usize,
    },
}

/// Provider backed by per-symbol vectors.
#[derive(Default)]
pub struct ScriptedProvider {
    bars: BTreeMap<String, Vec<RawBar>>,
    news: BTreeMap<String, Vec<RawNewsItem>>,
    failing: BTreeSet<String>,
    ignore_range: bool,
    calls: RefCell<Vec<ProviderCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_news(mut self, symbol: &str, news: Vec<RawNewsItem>) -> Self {
        self.news.insert(symbol.to_string(), news);
        self
    }

    /// Every call for `symbol` fails with a network error.
    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Return every scripted bar regardless of the requested window.
    pub fn ignoring_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.borrow().clone()
    }

    /// Bar windows requested for `symbol`, in call order.
    pub fn bar_requests(&self, symbol: &str) -> Vec<(NaiveDate, NaiveDate)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ProviderCall::Bars { symbol: s, start, end } if s == symbol => Some((*start, *end)),
                _ => None,
            })
            .collect()
    }

    fn check(&self, symbol: &str) -> Result<(), ProviderError> {
        if self.failing.contains(symbol) {
            return Err(ProviderError::NetworkUnreachable(format!(
                "scripted failure for {symbol}"
            )));
        }
        Ok(())
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        self.calls.borrow_mut().push(ProviderCall::Bars {
            symbol: symbol.to_string(),
            start,
            end,
        });
        self.check(symbol)?;

        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        if self.ignore_range {
            return Ok(bars);
        }
        Ok(bars
            .into_iter()
            .filter(|b| start <= b.date && b.date < end)
            .collect())
    }

    fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<RawNewsItem>, ProviderError> {
        self.calls.borrow_mut().push(ProviderCall::News {
            symbol: symbol.to_string(),
            count,
        });
        self.check(symbol)?;

        Ok(self
            .news
            .get(symbol)
            .map(|items| items.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }
}

/// Weekday bars with a simple rising close, for every date in `[start, end]`.
pub fn weekday_bars(start: NaiveDate, end: NaiveDate, base_close: f64) -> Vec<RawBar> {
    use chrono::Datelike;

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .enumerate()
        .map(|(i, date)| {
            let close = base_close + i as f64 * 0.5;
            RawBar {
                date,
                open: close - 0.25,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000 + i as u64,
                dividends: 0.0,
                splits: 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_bars_skip_weekends() {
        // 2024-01-01 is a Monday
        let bars = weekday_bars(d(2024, 1, 1), d(2024, 1, 14), 100.0);
        assert_eq!(bars.len(), 10);
        assert_eq!(bars[0].date, d(2024, 1, 1));
        assert_eq!(bars[4].date, d(2024, 1, 5));
        assert_eq!(bars[5].date, d(2024, 1, 8));
    }

    #[test]
    fn fetch_filters_to_window_and_records_call() {
        let provider = ScriptedProvider::new()
            .with_bars("SPY", weekday_bars(d(2024, 1, 1), d(2024, 1, 31), 470.0));
        let bars = provider
            .fetch_bars("SPY", d(2024, 1, 8), d(2024, 1, 12))
            .unwrap();
        // end excluded: Jan 8..11
        assert_eq!(bars.len(), 4);
        assert_eq!(bars.last().unwrap().date, d(2024, 1, 11));
        assert_eq!(provider.bar_requests("SPY"), vec![(d(2024, 1, 8), d(2024, 1, 12))]);
    }

    #[test]
    fn failing_symbol_errors() {
        let provider = ScriptedProvider::new().failing("BAD");
        assert!(provider.fetch_bars("BAD", d(2024, 1, 1), d(2024, 1, 2)).is_err());
        assert!(provider.fetch_news("BAD", 10).is_err());
        assert_eq!(provider.calls().len(), 2);
    }
}
