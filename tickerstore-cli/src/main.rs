//! tickerstore CLI: track tickers and keep their price bars and news in a
//! local SQLite file.
//!
//! Commands:
//! - `add` / `remove` / `list`: manage the tracked tickers
//! - `refresh`: incremental price refresh (one ticker or all)
//! - `news`: refresh news for every non-index ticker
//! - `bars` / `headlines`: print stored rows
//! - `status`: per-ticker coverage
//! - `export`: stored bars as CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use tickerstore_core::dates::{check_order, format_date, parse_optional};
use tickerstore_core::domain::normalize_ticker;
use tickerstore_core::refresh::{RefreshError, RefreshProgress};
use tickerstore_core::{AddOutcome, Config, Tracker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerstore",
    about = "Local SQLite cache of daily prices and news for tracked tickers"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Bounds for queries over stored rows; both ends included.
#[derive(clap::Args)]
struct Range {
    /// First date to show (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Last date to show (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,
}

impl Range {
    fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        parse_bounds(self.start.as_deref(), self.end.as_deref())
    }
}

/// Window to fetch from the provider; the end date is not fetched.
#[derive(clap::Args)]
struct FetchRange {
    /// First date to fetch (YYYY-MM-DD). Defaults to the day after the
    /// newest stored bar.
    #[arg(long)]
    start: Option<String>,

    /// Stop before this date (YYYY-MM-DD). Defaults to today, so today's
    /// unfinished session is never stored.
    #[arg(long)]
    end: Option<String>,
}

impl FetchRange {
    fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        parse_bounds(self.start.as_deref(), self.end.as_deref())
    }
}

fn parse_bounds(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let start = parse_optional(start)?;
    let end = parse_optional(end)?;
    check_order(start, end)?;
    Ok((start, end))
}

#[derive(Subcommand)]
enum Commands {
    /// Track tickers and load their history.
    Add {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        range: FetchRange,
    },
    /// Stop tracking tickers and delete their stored rows.
    Remove {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// List tracked tickers.
    List,
    /// Fetch missing price bars.
    Refresh {
        /// Only refresh this ticker.
        #[arg(long)]
        ticker: Option<String>,

        #[command(flatten)]
        range: FetchRange,
    },
    /// Fetch recent news for every non-index ticker.
    News,
    /// Print stored price bars, newest first.
    Bars {
        symbol: String,

        #[command(flatten)]
        range: Range,

        /// Print at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print stored news, newest first.
    Headlines {
        symbol: String,

        #[command(flatten)]
        range: Range,
    },
    /// Show stored coverage per ticker.
    Status,
    /// Write stored price bars as CSV.
    Export {
        symbol: String,

        #[command(flatten)]
        range: Range,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref(), cli.db)?;
    let mut tracker = Tracker::from_config(config).context("open tracker")?;

    match cli.command {
        Commands::Add { symbols, range } => run_add(&mut tracker, &symbols, &range),
        Commands::Remove { symbols } => run_remove(&mut tracker, &symbols),
        Commands::List => run_list(&tracker),
        Commands::Refresh { ticker, range } => run_refresh(&mut tracker, ticker.as_deref(), &range),
        Commands::News => {
            tracker.refresh_news(&ConsoleProgress)?;
            Ok(())
        }
        Commands::Bars {
            symbol,
            range,
            limit,
        } => run_bars(&tracker, &symbol, &range, limit),
        Commands::Headlines { symbol, range } => run_headlines(&tracker, &symbol, &range),
        Commands::Status => run_status(&tracker),
        Commands::Export {
            symbol,
            range,
            output,
        } => run_export(&tracker, &symbol, &range, output),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "tickerstore=debug,tickerstore_core=debug"
    } else {
        "tickerstore=info,tickerstore_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config` must exist; the default location is optional.
fn load_config(path: Option<&PathBuf>, db: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => match dirs::config_dir().map(|d| d.join("tickerstore").join("config.toml")) {
            Some(default) if default.exists() => Config::from_file(&default)?,
            _ => Config::default(),
        },
    };
    if let Some(db) = db {
        config.database = db;
    }
    config.validate()?;
    tracing::debug!(database = %config.database.display(), "using database");
    Ok(config)
}

fn run_add(tracker: &mut Tracker, symbols: &[String], range: &FetchRange) -> Result<()> {
    let (start, end) = range.parse()?;
    for symbol in symbols {
        let symbol = symbol.trim();
        match tracker.add_ticker(symbol, start, end)? {
            AddOutcome::AlreadyTracked => println!("{symbol}: already tracked"),
            AddOutcome::Added(Ok(outcome)) => println!("{symbol}: added, {outcome}"),
            AddOutcome::Added(Err(e)) => {
                println!("{symbol}: added, initial refresh failed: {e}")
            }
        }
    }
    Ok(())
}

fn run_remove(tracker: &mut Tracker, symbols: &[String]) -> Result<()> {
    for symbol in symbols {
        let symbol = symbol.trim();
        let removed = tracker.remove_ticker(symbol)?;
        if removed.existed {
            println!(
                "{symbol}: removed ({} bars, {} news items)",
                removed.bars, removed.news
            );
        } else {
            println!("{symbol}: not tracked");
        }
    }
    Ok(())
}

fn run_list(tracker: &Tracker) -> Result<()> {
    for ticker in tracker.tickers()? {
        println!("{ticker}");
    }
    Ok(())
}

fn run_refresh(tracker: &mut Tracker, ticker: Option<&str>, range: &FetchRange) -> Result<()> {
    let (start, end) = range.parse()?;
    match ticker {
        Some(raw) => {
            let Some(ticker) = normalize_ticker(raw) else {
                bail!("invalid ticker symbol: {raw:?}");
            };
            let ticker = ticker.as_str();
            if !tracker.store().has_ticker(ticker)? {
                bail!("{ticker} is not tracked; add it first");
            }
            let outcome = tracker
                .refresh_ticker(ticker, start, end)
                .with_context(|| format!("refresh {ticker}"))?;
            println!("{ticker}: {outcome}");
        }
        None => tracker.refresh_data(start, end, &ConsoleProgress)?,
    }
    Ok(())
}

fn run_bars(tracker: &Tracker, symbol: &str, range: &Range, limit: Option<usize>) -> Result<()> {
    let (start, end) = range.parse()?;
    let bars = tracker.bars(symbol, start, end)?;
    if bars.is_empty() {
        println!("No bars stored for {symbol}.");
        return Ok(());
    }

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>8} {:>6}",
        "Date", "Open", "High", "Low", "Close", "Volume", "Div", "Split"
    );
    println!("{}", "-".repeat(84));
    for bar in bars.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12} {:>8.4} {:>6}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.dividends, bar.splits
        );
    }
    Ok(())
}

fn run_headlines(tracker: &Tracker, symbol: &str, range: &Range) -> Result<()> {
    let (start, end) = range.parse()?;
    let items = tracker.news(symbol, start, end)?;
    if items.is_empty() {
        println!("No news stored for {symbol}.");
        return Ok(());
    }
    for item in &items {
        println!("{}  [{:<8}]  {}", item.date, item.sentiment, item.summary);
    }
    Ok(())
}

fn run_status(tracker: &Tracker) -> Result<()> {
    let rows = tracker.coverage()?;
    if rows.is_empty() {
        println!("No tickers tracked.");
        return Ok(());
    }

    println!("Database: {}", tracker.config().database.display());
    println!();
    println!("{:<10} {:<25} {:>8} {:>6}", "Ticker", "Date Range", "Bars", "News");
    println!("{}", "-".repeat(52));
    for row in &rows {
        let range = match (row.first_date, row.last_date) {
            (Some(first), Some(last)) => {
                format!("{} to {}", format_date(first), format_date(last))
            }
            _ => "(no bars)".into(),
        };
        println!(
            "{:<10} {:<25} {:>8} {:>6}",
            row.ticker, range, row.bar_count, row.news_count
        );
    }
    Ok(())
}

fn run_export(
    tracker: &Tracker,
    symbol: &str,
    range: &Range,
    output: Option<PathBuf>,
) -> Result<()> {
    let (start, end) = range.parse()?;
    let mut bars = tracker.bars(symbol, start, end)?;
    bars.reverse();

    let sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for bar in &bars {
        writer.serialize(bar)?;
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Wrote {} bars to {}", bars.len(), path.display());
    }
    Ok(())
}

/// Prints batch progress to stdout.
struct ConsoleProgress;

impl<T: Display> RefreshProgress<T> for ConsoleProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        print!("[{}/{}] {ticker}... ", index + 1, total);
        let _ = std::io::stdout().flush();
    }

    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<T, RefreshError>,
    ) {
        match result {
            Ok(outcome) => println!("{outcome}"),
            Err(e) => println!("FAILED: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("Done: {succeeded}/{total} succeeded, {failed} failed");
    }
}
