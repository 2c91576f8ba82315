//! Domain types for the ticker store

pub mod bar;
pub mod news;
pub mod range;

pub use bar::PriceBar;
pub use news::{NewsItem, Sentiment};
pub use range::DateRange;

/// Ticker symbol, e.g. `AAPL` or `^GSPC`.
pub type Ticker = String;

/// Trim surrounding whitespace from a user-entered symbol.
///
/// `None` when nothing is left or the symbol has inner whitespace or
/// control characters.
pub fn normalize_ticker(raw: &str) -> Option<Ticker> {
    let symbol = raw.trim();
    if symbol.is_empty() || symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }
    Some(symbol.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_trimmed() {
        assert_eq!(normalize_ticker(" AAPL\n").as_deref(), Some("AAPL"));
        assert_eq!(normalize_ticker("^GSPC").as_deref(), Some("^GSPC"));
        assert_eq!(normalize_ticker("BRK-B").as_deref(), Some("BRK-B"));
    }

    #[test]
    fn blank_or_spaced_symbols_are_rejected() {
        assert_eq!(normalize_ticker(""), None);
        assert_eq!(normalize_ticker("   "), None);
        assert_eq!(normalize_ticker("AA PL"), None);
        assert_eq!(normalize_ticker("AAPL\0"), None);
    }
}
