//! Progress reporting for multi-ticker refreshes.
//!
//! Batch refreshes never abort on a per-ticker failure and never return a
//! failure report; the progress callback and the log are where failures show
//! up.

use super::{RefreshError, RefreshOutcome};
use std::fmt::Display;

/// Progress callback for multi-ticker operations.
///
/// `T` is what one ticker's step produces: [`RefreshOutcome`] for price
/// refreshes, [`NewsOutcome`](crate::news::NewsOutcome) for news.
pub trait RefreshProgress<T = RefreshOutcome> {
    /// Called when starting to refresh a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker refresh completes, successfully or not.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<T, RefreshError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl<T: Display> RefreshProgress<T> for LogProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] refreshing {ticker}", index + 1, total);
    }

    fn on_complete(&self, ticker: &str, _index: usize, _total: usize, result: &Result<T, RefreshError>) {
        match result {
            Ok(outcome) => tracing::info!("{ticker}: {outcome}"),
            Err(e) => tracing::warn!("{ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!("refresh complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Discards all progress events.
pub struct SilentProgress;

impl<T> RefreshProgress<T> for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, _ticker: &str, _index: usize, _total: usize, _result: &Result<T, RefreshError>) {}

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
