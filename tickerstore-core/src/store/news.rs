//! News relation, keyed by (ticker, date, news_id).

use super::StoreResult;
use crate::domain::{NewsItem, Sentiment};
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};

impl ToSql for Sentiment {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Sentiment {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Insert-or-replace news items in one transaction.
pub fn upsert_news(conn: &mut Connection, items: &[NewsItem]) -> StoreResult<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT OR REPLACE INTO ticker_news
            (ticker, date, news_id, news_summary, sentiment)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;
        for item in items {
            stmt.execute(params![
                item.ticker,
                item.date,
                item.news_id,
                item.summary,
                item.sentiment,
            ])?;
        }
    }
    tx.commit()?;
    Ok(items.len())
}

/// News for a ticker within optional inclusive bounds, newest first.
pub fn query_news(
    conn: &Connection,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> StoreResult<Vec<NewsItem>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT ticker, date, news_id, news_summary, sentiment
        FROM ticker_news
        WHERE ticker = ?1
          AND (?2 IS NULL OR date >= ?2)
          AND (?3 IS NULL OR date <= ?3)
        ORDER BY date DESC, news_id
        "#,
    )?;
    let items = stmt
        .query_map(params![ticker, start, end], news_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn news_count(conn: &Connection, ticker: &str) -> StoreResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ticker_news WHERE ticker = ?1",
        params![ticker],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn news_from_row(row: &Row<'_>) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        ticker: row.get(0)?,
        date: row.get(1)?,
        news_id: row.get(2)?,
        summary: row.get(3)?,
        sentiment: row.get(4)?,
    })
}
