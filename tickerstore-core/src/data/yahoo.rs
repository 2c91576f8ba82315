//! Yahoo Finance data provider.
//!
//! Daily bars come from the v8 chart API with dividend and split events
//! attached; news comes from the v1 search API. Every call is a single
//! blocking request: no retries, no backoff. The only timeout is the HTTP
//! client's own.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes, which surface as `ProviderError::ResponseFormatChanged`.

use super::provider::{DataProvider, ProviderError, RawBar, RawNewsItem};
use crate::config::ProviderSettings;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const SEARCH_BASE: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

/// Yahoo Finance v1 search API response (news section only).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    uuid: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    provider_publish_time: Option<i64>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Build the chart API URL for a symbol and half-open date range.
    ///
    /// Session timestamps are UTC, so a session's instant can fall on the
    /// UTC day before or after its exchange-local date. The request is padded
    /// by one day on each side and [`within_window`] trims the result.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let utc_midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp();
        let start_ts = utc_midnight(start.pred_opt().unwrap_or(start));
        let end_ts = utc_midnight(end.succ_opt().unwrap_or(end));
        let symbol = encode_symbol(symbol);
        format!(
            "{CHART_BASE}/{symbol}?period1={start_ts}&period2={end_ts}\
             &interval=1d&events=div%2Csplits"
        )
    }

    fn search_url(symbol: &str, count: usize) -> String {
        let symbol = encode_symbol(symbol);
        format!("{SEARCH_BASE}?q={symbol}&quotesCount=0&newsCount={count}")
    }

    /// Issue one GET and decode the JSON body, mapping HTTP failures to
    /// structured errors.
    fn get_json<T: DeserializeOwned>(&self, url: &str, symbol: &str) -> Result<T, ProviderError> {
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ProviderError::NetworkUnreachable(format!("timed out fetching {symbol}: {e}"))
            } else {
                ProviderError::NetworkUnreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!(
                "failed to parse response for {symbol}: {e}"
            ))
        })
    }
}

/// Index symbols carry a caret, which must be escaped in a URL.
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E")
}

/// Exchange-local calendar date of a Unix timestamp.
fn local_date(ts: i64, gmtoffset: i64) -> Result<NaiveDate, ProviderError> {
    DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

/// Keep bars whose exchange-local date lies in `[start, end)`.
fn within_window(bars: Vec<RawBar>, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    bars.into_iter()
        .filter(|bar| start <= bar.date && bar.date < end)
        .collect()
}

/// Parse the chart API response into RawBars.
fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, ProviderError> {
    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            return Err(match resp.chart.error {
                Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                Some(err) => {
                    ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
                None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
            })
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

    // A window with no trading days comes back without timestamps.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

    let events = data.events.unwrap_or_default();
    let mut dividends: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for event in events.dividends.values() {
        *dividends.entry(local_date(event.date, gmtoffset)?).or_default() += event.amount;
    }
    let mut splits: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for event in events.splits.values() {
        if event.denominator != 0.0 {
            splits.insert(
                local_date(event.date, gmtoffset)?,
                event.numerator / event.denominator,
            );
        }
    }

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = local_date(ts, gmtoffset)?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();

        // Skip bars without a full OHLC set (holidays, halted sessions).
        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            continue;
        };

        bars.push(RawBar {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            dividends: dividends.get(&date).copied().unwrap_or(0.0),
            splits: splits.get(&date).copied().unwrap_or(0.0),
        });
    }

    Ok(bars)
}

/// Parse the search API response into RawNewsItems.
fn parse_news(resp: SearchResponse, count: usize) -> Vec<RawNewsItem> {
    resp.news
        .into_iter()
        .filter_map(|n| {
            let title = n.title.filter(|t| !t.trim().is_empty())?;
            Some(RawNewsItem {
                id: n.uuid.filter(|id| !id.is_empty()),
                title,
                summary: n.summary,
                published: n
                    .provider_publish_time
                    .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            })
        })
        .take(count)
        .collect()
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let url = Self::chart_url(symbol, start, end);
        let chart: ChartResponse = self.get_json(&url, symbol)?;
        Ok(within_window(parse_chart(symbol, chart)?, start, end))
    }

    fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<RawNewsItem>, ProviderError> {
        let url = Self::search_url(symbol, count);
        let search: SearchResponse = self.get_json(&url, symbol)?;
        Ok(parse_news(search, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn chart(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    // Two NYSE sessions (14:30 UTC opens), a null holiday row, one dividend.
    const AAPL_CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "gmtoffset": -18000},
                "timestamp": [1707316200, 1707402600, 1707489000],
                "events": {
                    "dividends": {
                        "1707489000": {"amount": 0.24, "date": 1707489000}
                    }
                },
                "indicators": {
                    "quote": [{
                        "open":   [190.0, null, 188.65],
                        "high":   [191.05, null, 189.99],
                        "low":    [188.61, null, 188.0],
                        "close":  [189.41, null, 188.85],
                        "volume": [53439000, null, 45155200]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_bars_and_skips_null_rows() {
        let bars = parse_chart("AAPL", chart(AAPL_CHART)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 2, 7));
        assert_eq!(bars[0].close, 189.41);
        assert_eq!(bars[0].volume, 53_439_000);
        assert_eq!(bars[0].dividends, 0.0);
        assert_eq!(bars[1].date, d(2024, 2, 9));
    }

    #[test]
    fn attaches_dividend_to_its_session() {
        let bars = parse_chart("AAPL", chart(AAPL_CHART)).unwrap();
        assert_eq!(bars[1].dividends, 0.24);
        assert_eq!(bars[1].splits, 0.0);
    }

    #[test]
    fn split_ratio_is_numerator_over_denominator() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": -14400},
                    "timestamp": [1598880600],
                    "events": {
                        "splits": {
                            "1598880600": {"date": 1598880600, "numerator": 4.0, "denominator": 1.0, "splitRatio": "4:1"}
                        }
                    },
                    "indicators": {"quote": [{
                        "open": [127.58], "high": [131.0], "low": [126.0],
                        "close": [129.04], "volume": [225702700]
                    }]}
                }],
                "error": null
            }
        }"#;
        let bars = parse_chart("AAPL", chart(json)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d(2020, 8, 31));
        assert_eq!(bars[0].splits, 4.0);
    }

    #[test]
    fn missing_timestamps_means_no_trading() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": -18000},
                    "indicators": {"quote": [{}]}
                }],
                "error": null
            }
        }"#;
        let bars = parse_chart("AAPL", chart(json)).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        match parse_chart("ZZZZ", chart(json)) {
            Err(ProviderError::SymbolNotFound { symbol }) => assert_eq!(symbol, "ZZZZ"),
            other => panic!("expected SymbolNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn other_chart_errors_are_format_errors() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Bad Request", "description": "Invalid input"}}}"#;
        assert!(matches!(
            parse_chart("AAPL", chart(json)),
            Err(ProviderError::ResponseFormatChanged(_))
        ));
    }

    #[test]
    fn chart_url_pads_both_ends_by_a_day() {
        let url = YahooProvider::chart_url("META", d(2024, 1, 1), d(2024, 1, 31));
        assert!(url.starts_with(CHART_BASE));
        assert!(url.contains("/META?"));
        // 2023-12-31T00:00:00Z
        assert!(url.contains("period1=1703980800"));
        // 2024-02-01T00:00:00Z
        assert!(url.contains("period2=1706745600"));
        assert!(url.contains("interval=1d"));
    }

    // ASX sessions open at 10:00 AEDT (+11h): each is stamped 23:00 UTC on
    // the previous calendar day.
    const AXJO_CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^AXJO", "gmtoffset": 39600},
                "timestamp": [1704841200, 1704927600, 1705014000],
                "indicators": {
                    "quote": [{
                        "open":   [7498.3, 7523.9, 7498.1],
                        "high":   [7530.0, 7550.2, 7520.4],
                        "low":    [7480.1, 7490.7, 7470.0],
                        "close":  [7523.9, 7498.1, 7498.6],
                        "volume": [0, 0, 0]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn period(url: &str, key: &str) -> i64 {
        let tail = &url[url.find(key).unwrap() + key.len()..];
        tail.split('&').next().unwrap().parse().unwrap()
    }

    #[test]
    fn east_of_utc_session_is_inside_the_request() {
        let bars = parse_chart("^AXJO", chart(AXJO_CHART)).unwrap();
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 10), d(2024, 1, 11), d(2024, 1, 12)]);

        // One-day window for the Jan 11 session stamped 2024-01-10T23:00Z.
        let url = YahooProvider::chart_url("^AXJO", d(2024, 1, 11), d(2024, 1, 12));
        let session_ts = 1704927600;
        assert!(period(&url, "period1=") <= session_ts);
        assert!(session_ts < period(&url, "period2="));

        let kept = within_window(bars, d(2024, 1, 11), d(2024, 1, 12));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, d(2024, 1, 11));
        assert_eq!(kept[0].close, 7498.1);
    }

    #[test]
    fn padding_is_trimmed_to_local_dates() {
        // NYSE sessions Feb 7 and Feb 9; the padded request can return both
        let bars = parse_chart("AAPL", chart(AAPL_CHART)).unwrap();
        let kept = within_window(bars, d(2024, 2, 8), d(2024, 2, 9));
        assert!(kept.is_empty());

        let bars = parse_chart("AAPL", chart(AAPL_CHART)).unwrap();
        let kept = within_window(bars, d(2024, 2, 7), d(2024, 2, 9));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, d(2024, 2, 7));
    }

    #[test]
    fn index_symbols_are_escaped() {
        let url = YahooProvider::chart_url("^GSPC", d(2024, 1, 1), d(2024, 1, 31));
        assert!(url.contains("/%5EGSPC?"));
        assert!(YahooProvider::search_url("^GSPC", 5).contains("q=%5EGSPC&"));
    }

    #[test]
    fn parses_news_and_caps_count() {
        let json = r#"{
            "news": [
                {"uuid": "a1", "title": "Apple beats estimates", "publisher": "Reuters", "providerPublishTime": 1707402600},
                {"uuid": "", "title": "Apple supplier warning"},
                {"uuid": "c3", "title": "   "},
                {"uuid": "d4", "title": "Third story", "providerPublishTime": 1707489000}
            ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let items = parse_news(resp, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_deref(), Some("a1"));
        assert_eq!(
            items[0].published,
            DateTime::from_timestamp(1_707_402_600, 0)
        );
        assert_eq!(items[1].id, None);
        assert_eq!(items[1].published, None);
    }

    #[test]
    fn search_without_news_section_is_empty() {
        let resp: SearchResponse = serde_json::from_str(r#"{"quotes": []}"#).unwrap();
        assert!(parse_news(resp, 10).is_empty());
    }
}
