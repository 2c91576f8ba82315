//! Ticker tracker: one store, one provider and one classifier behind the
//! add / remove / refresh / query entry points.

use crate::config::Config;
use crate::data::{DataProvider, YahooProvider};
use crate::domain::{normalize_ticker, NewsItem, PriceBar, Ticker};
use crate::news::{self, NewsOutcome};
use crate::refresh::{self, RefreshError, RefreshOutcome, RefreshProgress};
use crate::sentiment::{LexiconClassifier, SentimentClassifier};
use crate::store::{RemovedTicker, Store, StoreError, TickerCoverage};
use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

/// Failure building a tracker or changing the tracked set.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] crate::data::ProviderError),
}

/// Result of adding a ticker.
#[derive(Debug)]
pub enum AddOutcome {
    /// The ticker was inserted; carries the result of its initial refresh.
    Added(Result<RefreshOutcome, RefreshError>),
    /// The ticker was already tracked; nothing was fetched.
    AlreadyTracked,
}

pub struct Tracker {
    store: Store,
    provider: Box<dyn DataProvider>,
    classifier: Box<dyn SentimentClassifier>,
    config: Config,
    today: Option<NaiveDate>,
}

impl Tracker {
    pub fn new(
        store: Store,
        provider: Box<dyn DataProvider>,
        classifier: Box<dyn SentimentClassifier>,
        config: Config,
    ) -> Self {
        Self {
            store,
            provider,
            classifier,
            config,
            today: None,
        }
    }

    /// Open the configured database with the Yahoo provider and the lexicon
    /// classifier.
    pub fn from_config(config: Config) -> Result<Self, TrackerError> {
        let store = Store::open(&config.database)?;
        let provider = YahooProvider::new(&config.provider)?;
        Ok(Self::new(
            store,
            Box::new(provider),
            Box::new(LexiconClassifier::new()),
            config,
        ))
    }

    /// Pin the current date instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Track a ticker and load its history for `[start, end)`.
    ///
    /// The symbol is trimmed first; a blank one is refused before anything
    /// is stored. A failure during the initial refresh is logged and
    /// returned inside [`AddOutcome::Added`]; the ticker stays tracked.
    pub fn add_ticker(
        &mut self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<AddOutcome, TrackerError> {
        let ticker = normalize_ticker(ticker)
            .ok_or_else(|| TrackerError::InvalidTicker(ticker.to_string()))?;
        let ticker = ticker.as_str();
        if !self.store.add_ticker(ticker)? {
            info!(ticker, "already tracked");
            return Ok(AddOutcome::AlreadyTracked);
        }
        info!(ticker, "added ticker");

        let result = self.refresh_ticker(ticker, start, end);
        if let Err(e) = &result {
            warn!(ticker, error = %e, "initial refresh failed");
        }
        Ok(AddOutcome::Added(result))
    }

    /// Stop tracking a ticker and delete its bars and news.
    pub fn remove_ticker(&mut self, ticker: &str) -> Result<RemovedTicker, TrackerError> {
        let ticker = normalize_ticker(ticker)
            .ok_or_else(|| TrackerError::InvalidTicker(ticker.to_string()))?;
        let ticker = ticker.as_str();
        let removed = self.store.remove_ticker(ticker)?;
        if removed.existed {
            info!(ticker, bars = removed.bars, news = removed.news, "removed ticker");
        } else {
            info!(ticker, "not tracked, nothing removed");
        }
        Ok(removed)
    }

    pub fn refresh_ticker(
        &mut self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RefreshOutcome, RefreshError> {
        let today = self.today();
        refresh::refresh_ticker(
            &mut self.store,
            self.provider.as_ref(),
            ticker,
            start,
            end,
            &self.config.refresh,
            today,
        )
    }

    /// Refresh bars for every tracked ticker.
    pub fn refresh_data(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        progress: &dyn RefreshProgress,
    ) -> Result<(), StoreError> {
        let today = self.today();
        refresh::refresh_all(
            &mut self.store,
            self.provider.as_ref(),
            start,
            end,
            &self.config.refresh,
            today,
            progress,
        )
    }

    /// Refresh news for every tracked non-index ticker.
    pub fn refresh_news(
        &mut self,
        progress: &dyn RefreshProgress<NewsOutcome>,
    ) -> Result<(), StoreError> {
        let today = self.today();
        news::refresh_news(
            &mut self.store,
            self.provider.as_ref(),
            self.classifier.as_ref(),
            &self.config.news,
            today,
            progress,
        )
    }

    pub fn tickers(&self) -> Result<Vec<Ticker>, StoreError> {
        self.store.tickers()
    }

    pub fn bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, StoreError> {
        self.store.bars(ticker, start, end)
    }

    pub fn news(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NewsItem>, StoreError> {
        self.store.news(ticker, start, end)
    }

    pub fn coverage(&self) -> Result<Vec<TickerCoverage>, StoreError> {
        self.store
            .tickers()?
            .iter()
            .map(|t| self.store.coverage(t))
            .collect()
    }
}
