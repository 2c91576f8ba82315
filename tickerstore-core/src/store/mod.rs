//! SQLite storage layer.
//!
//! Owns the three relations (tickers, price bars, news items) in a single
//! database file. Each submodule holds the SQL for one relation as free
//! functions over a `Connection`; `Store` wraps the connection and exposes
//! them as methods.

mod bars;
mod news;
pub(crate) mod schema;
mod tickers;

pub use tickers::RemovedTicker;

use crate::domain::{NewsItem, PriceBar, Ticker};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What is stored for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerCoverage {
    pub ticker: String,
    pub bar_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub news_count: usize,
}

/// Handle on the ticker database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Tickers ==========

    /// Insert a ticker row; false if it was already tracked.
    pub fn add_ticker(&self, ticker: &str) -> StoreResult<bool> {
        tickers::insert_ticker(&self.conn, ticker)
    }

    pub fn has_ticker(&self, ticker: &str) -> StoreResult<bool> {
        tickers::ticker_exists(&self.conn, ticker)
    }

    pub fn tickers(&self) -> StoreResult<Vec<Ticker>> {
        tickers::list_tickers(&self.conn)
    }

    /// Delete a ticker and every row stored for it.
    pub fn remove_ticker(&mut self, ticker: &str) -> StoreResult<RemovedTicker> {
        tickers::remove_ticker(&mut self.conn, ticker)
    }

    // ========== Price bars ==========

    pub fn latest_bar_date(&self, ticker: &str) -> StoreResult<Option<NaiveDate>> {
        bars::latest_bar_date(&self.conn, ticker)
    }

    /// Upsert bars in one transaction; returns the number of rows written.
    pub fn upsert_bars(&mut self, bars: &[PriceBar]) -> StoreResult<usize> {
        bars::upsert_bars(&mut self.conn, bars)
    }

    /// Bars within optional inclusive bounds, newest first.
    pub fn bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> StoreResult<Vec<PriceBar>> {
        bars::query_bars(&self.conn, ticker, start, end)
    }

    // ========== News ==========

    pub fn upsert_news(&mut self, items: &[NewsItem]) -> StoreResult<usize> {
        news::upsert_news(&mut self.conn, items)
    }

    /// News within optional inclusive bounds, newest first.
    pub fn news(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> StoreResult<Vec<NewsItem>> {
        news::query_news(&self.conn, ticker, start, end)
    }

    // ========== Status ==========

    pub fn coverage(&self, ticker: &str) -> StoreResult<TickerCoverage> {
        let (bar_count, first_date, last_date) = bars::bar_span(&self.conn, ticker)?;
        Ok(TickerCoverage {
            ticker: ticker.to_string(),
            bar_count,
            first_date,
            last_date,
            news_count: news::news_count(&self.conn, ticker)?,
        })
    }
}
