//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources so the refresh
//! logic can be driven by Yahoo Finance in production and by a scripted
//! provider in tests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a data provider, before it is keyed to a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub dividends: f64,
    pub splits: f64,
}

/// Raw news entry from a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNewsItem {
    /// Provider-assigned identifier, when the provider has one.
    pub id: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// Structured error types for provider calls.
///
/// These are displayable as-is in log lines and CLI output.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider setup failed: {0}")]
    Setup(String),
}

/// Trait for market-data providers.
///
/// Implementations only fetch; they never touch the store.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over the half-open range `[start, end)`,
    /// keyed by exchange-local session date.
    ///
    /// Days without trading are simply absent. An empty vector is a valid
    /// answer (e.g. a window covering only a weekend).
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError>;

    /// Fetch up to `count` recent news items for a symbol.
    fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<RawNewsItem>, ProviderError>;
}
