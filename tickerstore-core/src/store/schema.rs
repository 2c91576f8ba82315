//! Table bootstrap.
//!
//! Dates are ISO `YYYY-MM-DD` text, so lexical order is calendar order and
//! `MAX(date)` is the latest stored day.

use super::StoreResult;
use rusqlite::Connection;

#[cfg(test)]
const TABLES: [&str; 3] = ["tickers", "ticker_data", "ticker_news"];

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS tickers (
    ticker TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS ticker_data (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    open REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    close REAL NOT NULL,
    volume INTEGER NOT NULL,
    dividends REAL NOT NULL DEFAULT 0,
    stocksplits REAL NOT NULL DEFAULT 0,
    PRIMARY KEY (ticker, date)
);

CREATE TABLE IF NOT EXISTS ticker_news (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    news_id TEXT NOT NULL,
    news_summary TEXT NOT NULL,
    sentiment TEXT NOT NULL,
    PRIMARY KEY (ticker, date, news_id)
);
"#;

/// Create all tables if they do not exist yet. Safe to run on every open.
pub fn create_tables(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(CREATE_TABLES)?;
    tracing::debug!("schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let names = table_names(&conn);
        for table in TABLES {
            assert!(names.iter().any(|n| n == table), "missing table {table}");
        }
    }

    #[test]
    fn create_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute("INSERT INTO tickers (ticker) VALUES ('AAPL')", [])
            .unwrap();
        create_tables(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tickers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "re-running the bootstrap must keep existing rows");
    }
}
