//! Incremental price refresh.
//!
//! For each ticker the missing window is resolved against what is already
//! stored, fetched from the provider, clipped to the window and upserted
//! keyed by (ticker, date). A batch refresh walks every tracked ticker and
//! keeps going past per-ticker failures.

pub mod progress;

pub use progress::{LogProgress, RefreshProgress, SilentProgress};

use crate::config::RefreshSettings;
use crate::data::{DataProvider, ProviderError, RawBar};
use crate::dates::years_before;
use crate::domain::{DateRange, PriceBar};
use crate::store::{Store, StoreError};
use chrono::{Days, NaiveDate};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure refreshing one ticker.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a single-ticker refresh did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Bars were fetched and upserted.
    Updated { rows: usize, range: DateRange },
    /// The window was fetched but the provider had no bars in it.
    NoData { range: DateRange },
    /// Stored data already reaches the requested end.
    UpToDate,
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshOutcome::Updated { rows, range } => write!(f, "{rows} bars upserted ({range})"),
            RefreshOutcome::NoData { range } => write!(f, "no bars returned ({range})"),
            RefreshOutcome::UpToDate => write!(f, "up to date"),
        }
    }
}

/// Result of window resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshWindow {
    Fetch(DateRange),
    UpToDate,
}

/// Decide which dates to fetch.
///
/// The window is half-open: `end` is never fetched, so a missing `end`
/// (today) leaves today's unfinished session for a later refresh.
///
/// An explicit `start` is used verbatim. Otherwise the window starts the day
/// after `latest_stored`, or `lookback_years` before the end when nothing is
/// stored. A start on or after the end yields [`RefreshWindow::UpToDate`].
pub fn resolve_window(
    latest_stored: Option<NaiveDate>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    lookback_years: u32,
) -> RefreshWindow {
    let end = end.unwrap_or(today);
    let start = match (start, latest_stored) {
        (Some(start), _) => Some(start),
        (None, Some(latest)) => latest.checked_add_days(Days::new(1)),
        (None, None) => Some(years_before(end, lookback_years)),
    };

    match start {
        Some(start) if start < end => RefreshWindow::Fetch(DateRange::new(start, end)),
        _ => RefreshWindow::UpToDate,
    }
}

/// Refresh one ticker's bars.
///
/// Bars the provider returns outside `[start, end)` are dropped before the
/// upsert. The upsert is one transaction: a storage failure leaves no rows.
pub fn refresh_ticker(
    store: &mut Store,
    provider: &dyn DataProvider,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    settings: &RefreshSettings,
    today: NaiveDate,
) -> Result<RefreshOutcome, RefreshError> {
    let latest = store.latest_bar_date(ticker)?;
    let range = match resolve_window(latest, start, end, today, settings.lookback_years) {
        RefreshWindow::Fetch(range) => range,
        RefreshWindow::UpToDate => {
            debug!(ticker, ?latest, "already up to date");
            return Ok(RefreshOutcome::UpToDate);
        }
    };

    debug!(ticker, %range, days = range.days(), provider = provider.name(), "fetching bars");
    let raw = provider.fetch_bars(ticker, range.start, range.end)?;
    let fetched = raw.len();
    let bars: Vec<PriceBar> = raw
        .into_iter()
        .filter(|bar| range.contains(bar.date))
        .map(|bar| to_price_bar(ticker, bar))
        .filter(|bar| !bar.is_void())
        .collect();

    if bars.len() < fetched {
        debug!(ticker, dropped = fetched - bars.len(), "dropped bars outside window or without prices");
    }
    let actions = bars.iter().filter(|b| b.has_corporate_action()).count();
    if actions > 0 {
        debug!(ticker, actions, "window contains dividends or splits");
    }
    if bars.is_empty() {
        info!(ticker, %range, "provider returned no bars");
        return Ok(RefreshOutcome::NoData { range });
    }

    let rows = store.upsert_bars(&bars)?;
    info!(ticker, rows, %range, "upserted bars");
    Ok(RefreshOutcome::Updated { rows, range })
}

/// Refresh every tracked ticker in symbol order.
///
/// Only a failure listing the tickers is returned; per-ticker errors go to
/// the log and to `progress`.
pub fn refresh_all(
    store: &mut Store,
    provider: &dyn DataProvider,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    settings: &RefreshSettings,
    today: NaiveDate,
    progress: &dyn RefreshProgress,
) -> Result<(), StoreError> {
    let tickers = store.tickers()?;
    let total = tickers.len();
    let mut succeeded = 0;
    let mut failed = 0;

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);

        let result = refresh_ticker(store, provider, ticker, start, end, settings, today);
        if let Err(e) = &result {
            warn!(ticker = %ticker, error = %e, "refresh failed, continuing");
        }
        progress.on_complete(ticker, i, total, &result);

        match result {
            Ok(_) => succeeded += 1,
            Err(_) => failed += 1,
        }
    }

    progress.on_batch_complete(succeeded, failed, total);
    Ok(())
}

fn to_price_bar(ticker: &str, raw: RawBar) -> PriceBar {
    PriceBar {
        ticker: ticker.to_string(),
        date: raw.date,
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        volume: i64::try_from(raw.volume).unwrap_or(i64::MAX),
        dividends: raw.dividends,
        splits: raw.splits,
    }
}
