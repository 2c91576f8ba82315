//! Ticker relation: identity rows and cascading removal.

use super::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Rows deleted by a ticker removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovedTicker {
    /// Whether the ticker row itself existed.
    pub existed: bool,
    pub bars: usize,
    pub news: usize,
}

/// Insert a ticker. Returns false (and changes nothing) if it already exists.
pub fn insert_ticker(conn: &Connection, ticker: &str) -> StoreResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO tickers (ticker) VALUES (?1)",
        params![ticker],
    )?;
    Ok(inserted > 0)
}

pub fn ticker_exists(conn: &Connection, ticker: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM tickers WHERE ticker = ?1",
            params![ticker],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// All tracked tickers in ascending symbol order.
pub fn list_tickers(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT ticker FROM tickers ORDER BY ticker")?;
    let tickers = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(tickers)
}

/// Delete a ticker with its price and news rows in one transaction.
pub fn remove_ticker(conn: &mut Connection, ticker: &str) -> StoreResult<RemovedTicker> {
    let tx = conn.transaction()?;
    let existed = tx.execute("DELETE FROM tickers WHERE ticker = ?1", params![ticker])? > 0;
    let bars = tx.execute("DELETE FROM ticker_data WHERE ticker = ?1", params![ticker])?;
    let news = tx.execute("DELETE FROM ticker_news WHERE ticker = ?1", params![ticker])?;
    tx.commit()?;

    Ok(RemovedTicker {
        existed,
        bars,
        news,
    })
}
