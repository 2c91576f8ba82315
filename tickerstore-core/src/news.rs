//! News refresh: fetch recent items per ticker, assign stable ids, label
//! sentiment and upsert.

use crate::config::NewsSettings;
use crate::data::{DataProvider, RawNewsItem};
use crate::domain::NewsItem;
use crate::refresh::{RefreshError, RefreshProgress};
use crate::sentiment::SentimentClassifier;
use crate::store::{Store, StoreError};
use chrono::{NaiveDate, SecondsFormat};
use std::fmt;
use tracing::{debug, info, warn};

/// What a single-ticker news refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsOutcome {
    pub items: usize,
}

impl fmt::Display for NewsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} news items upserted", self.items)
    }
}

/// Index symbols (e.g. `^GSPC`) carry no news.
pub fn is_index(symbol: &str, marker: &str) -> bool {
    !marker.is_empty() && symbol.starts_with(marker)
}

/// Provider id when present, otherwise a BLAKE3 digest of the title and the
/// RFC 3339 published timestamp.
pub fn news_id_for(item: &RawNewsItem) -> String {
    if let Some(id) = item.id.as_deref().filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    let published = item
        .published
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    let mut hasher = blake3::Hasher::new();
    hasher.update(item.title.as_bytes());
    hasher.update(published.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Convert a provider item into a stored row for `ticker`.
pub fn to_news_item(
    ticker: &str,
    item: &RawNewsItem,
    classifier: &dyn SentimentClassifier,
    today: NaiveDate,
) -> NewsItem {
    let summary = item
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&item.title)
        .to_string();

    NewsItem {
        ticker: ticker.to_string(),
        date: item.published.map(|t| t.date_naive()).unwrap_or(today),
        news_id: news_id_for(item),
        sentiment: classifier.classify(&summary),
        summary,
    }
}

/// Fetch and store news for one ticker. Returns the number of items upserted.
pub fn refresh_ticker_news(
    store: &mut Store,
    provider: &dyn DataProvider,
    classifier: &dyn SentimentClassifier,
    ticker: &str,
    settings: &NewsSettings,
    today: NaiveDate,
) -> Result<usize, RefreshError> {
    let raw = provider.fetch_news(ticker, settings.count)?;
    let items: Vec<NewsItem> = raw
        .iter()
        .take(settings.count)
        .map(|item| to_news_item(ticker, item, classifier, today))
        .collect();

    if items.is_empty() {
        debug!(ticker, "no news returned");
        return Ok(0);
    }
    let upserted = store.upsert_news(&items)?;
    info!(ticker, items = upserted, "upserted news");
    Ok(upserted)
}

/// Refresh news for every tracked non-index ticker.
pub fn refresh_news(
    store: &mut Store,
    provider: &dyn DataProvider,
    classifier: &dyn SentimentClassifier,
    settings: &NewsSettings,
    today: NaiveDate,
    progress: &dyn RefreshProgress<NewsOutcome>,
) -> Result<(), StoreError> {
    let tickers: Vec<String> = store
        .tickers()?
        .into_iter()
        .filter(|t| {
            let index = is_index(t, &settings.index_marker);
            if index {
                debug!(ticker = %t, "skipping index for news");
            }
            !index
        })
        .collect();

    let total = tickers.len();
    let mut succeeded = 0;
    let mut failed = 0;

    for (i, ticker) in tickers.iter().enumerate() {
        progress.on_start(ticker, i, total);

        let result = refresh_ticker_news(store, provider, classifier, ticker, settings, today)
            .map(|items| NewsOutcome { items });
        if let Err(e) = &result {
            warn!(ticker = %ticker, error = %e, "news refresh failed, continuing");
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
