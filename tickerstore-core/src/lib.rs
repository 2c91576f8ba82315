//! tickerstore core: a local SQLite cache of daily price bars and news for a
//! set of tickers, refreshed incrementally from a market-data provider.
//!
//! - Domain types (price bars, news items, sentiment, date ranges)
//! - SQLite storage with insert-or-replace upserts on composite keys
//! - Window resolution and per-ticker / batch refresh of price bars
//! - News refresh with stable ids and lexicon sentiment labels
//! - `Tracker` facade tying store, provider and classifier together

pub mod config;
pub mod data;
pub mod dates;
pub mod domain;
pub mod news;
pub mod refresh;
pub mod sentiment;
pub mod store;
pub mod tracker;

pub use config::Config;
pub use data::{DataProvider, ProviderError, YahooProvider};
pub use domain::{DateRange, NewsItem, PriceBar, Sentiment};
pub use news::NewsOutcome;
pub use refresh::{RefreshError, RefreshOutcome, RefreshProgress, RefreshWindow};
pub use sentiment::{LexiconClassifier, SentimentClassifier};
pub use store::{Store, StoreError};
pub use tracker::{AddOutcome, Tracker, TrackerError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: values that cross into the CLI or a worker thread
    /// are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceBar>();
        require_sync::<PriceBar>();
        require_send::<NewsItem>();
        require_sync::<NewsItem>();
        require_send::<DateRange>();
        require_sync::<DateRange>();
        require_send::<Config>();
        require_sync::<Config>();
        require_send::<RefreshOutcome>();
        require_sync::<RefreshOutcome>();
        require_send::<RefreshError>();
        require_send::<ProviderError>();
        require_sync::<ProviderError>();
        require_send::<LexiconClassifier>();
        require_sync::<LexiconClassifier>();
        require_send::<YahooProvider>();
        require_sync::<YahooProvider>();
    }

    /// The tracker only needs trait objects for its collaborators.
    #[test]
    fn collaborators_are_object_safe() {
        fn _provider(_: &dyn DataProvider) {}
        fn _classifier(_: &dyn SentimentClassifier) {}
        fn _progress(_: &dyn RefreshProgress) {}
        fn _news_progress(_: &dyn RefreshProgress<NewsOutcome>) {}
    }
}
