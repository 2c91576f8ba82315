//! Price bar relation, keyed by (ticker, date).

use super::StoreResult;
use crate::domain::PriceBar;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

/// Insert-or-replace bars in one transaction. A row with an existing
/// (ticker, date) key is overwritten in full.
pub fn upsert_bars(conn: &mut Connection, bars: &[PriceBar]) -> StoreResult<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT OR REPLACE INTO ticker_data
            (ticker, date, open, high, low, close, volume, dividends, stocksplits)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )?;
        for bar in bars {
            stmt.execute(params![
                bar.ticker,
                bar.date,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume,
                bar.dividends,
                bar.splits,
            ])?;
        }
    }
    tx.commit()?;
    Ok(bars.len())
}

/// Latest stored bar date for a ticker, if any.
pub fn latest_bar_date(conn: &Connection, ticker: &str) -> StoreResult<Option<NaiveDate>> {
    let latest = conn.query_row(
        "SELECT MAX(date) FROM ticker_data WHERE ticker = ?1",
        params![ticker],
        |row| row.get(0),
    )?;
    Ok(latest)
}

/// Bars for a ticker within optional inclusive bounds, newest first.
pub fn query_bars(
    conn: &Connection,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> StoreResult<Vec<PriceBar>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT ticker, date, open, high, low, close, volume, dividends, stocksplits
        FROM ticker_data
        WHERE ticker = ?1
          AND (?2 IS NULL OR date >= ?2)
          AND (?3 IS NULL OR date <= ?3)
        ORDER BY date DESC
        "#,
    )?;
    let bars = stmt
        .query_map(params![ticker, start, end], bar_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bars)
}

/// Bar count and first/last stored date for a ticker.
pub fn bar_span(
    conn: &Connection,
    ticker: &str,
) -> StoreResult<(usize, Option<NaiveDate>, Option<NaiveDate>)> {
    let span = conn.query_row(
        "SELECT COUNT(*), MIN(date), MAX(date) FROM ticker_data WHERE ticker = ?1",
        params![ticker],
        |row| Ok((row.get::<_, i64>(0)? as usize, row.get(1)?, row.get(2)?)),
    )?;
    Ok(span)
}

fn bar_from_row(row: &Row<'_>) -> rusqlite::Result<PriceBar> {
    Ok(PriceBar {
        ticker: row.get(0)?,
        date: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: row.get(6)?,
        dividends: row.get(7)?,
        splits: row.get(8)?,
    })
}
