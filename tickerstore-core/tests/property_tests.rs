//! Property tests for refresh and query invariants.
//!
//! Uses proptest to verify:
//! 1. Window resolution never yields a fetch whose start is on/after its end,
//!    and a default window never covers today
//! 2. An explicit start is honored verbatim and stored history is continued
//! 3. Bar queries are strictly descending and respect inclusive bounds
//! 4. Upserting the same bars again never changes the row count

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use tickerstore_core::refresh::{resolve_window, RefreshWindow};
use tickerstore_core::{PriceBar, Store};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..10_000).prop_map(|n| base() + Days::new(n))
}

fn arb_opt_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of(arb_date())
}

fn bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        ticker: "SPY".into(),
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
        dividends: 0.0,
        splits: 0.0,
    }
}

// ── 1–2. Window resolution ───────────────────────────────────────────

proptest! {
    #[test]
    fn window_start_is_before_end(
        latest in arb_opt_date(),
        start in arb_opt_date(),
        end in arb_opt_date(),
        today in arb_date(),
        years in 1u32..30,
    ) {
        match resolve_window(latest, start, end, today, years) {
            RefreshWindow::Fetch(range) => {
                prop_assert!(range.start < range.end);
                prop_assert_eq!(range.end, end.unwrap_or(today));
                if end.is_none() {
                    prop_assert!(!range.contains(today));
                }
            }
            RefreshWindow::UpToDate => {}
        }
    }

    #[test]
    fn explicit_start_wins_over_history(
        latest in arb_opt_date(),
        start in arb_date(),
        end in arb_date(),
    ) {
        let w = resolve_window(latest, Some(start), Some(end), end, 10);
        if start < end {
            match w {
                RefreshWindow::Fetch(range) => prop_assert_eq!(range.start, start),
                RefreshWindow::UpToDate => prop_assert!(false, "expected a fetch"),
            }
        } else {
            prop_assert_eq!(w, RefreshWindow::UpToDate);
        }
    }

    #[test]
    fn history_is_continued_the_next_day(latest in arb_date(), gap in 2u64..400) {
        let today = latest + Days::new(gap);
        match resolve_window(Some(latest), None, None, today, 10) {
            RefreshWindow::Fetch(range) => {
                prop_assert_eq!(range.start, latest + Days::new(1));
                prop_assert_eq!(range.end, today);
            }
            RefreshWindow::UpToDate => prop_assert!(false, "expected a fetch"),
        }
    }
}

// ── 3–4. Queries and upserts ─────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn queries_are_descending_and_bounded(
        offsets in prop::collection::btree_set(0u64..200, 1..60),
        lo in 0u64..200,
        len in 0u64..200,
    ) {
        let mut store = Store::open_in_memory().unwrap();
        let bars: Vec<PriceBar> = offsets
            .iter()
            .map(|&o| bar(base() + Days::new(o), 100.0 + o as f64))
            .collect();
        store.upsert_bars(&bars).unwrap();

        let start = base() + Days::new(lo);
        let end = start + Days::new(len);
        let got = store.bars("SPY", Some(start), Some(end)).unwrap();

        for pair in got.windows(2) {
            prop_assert!(pair[0].date > pair[1].date);
        }
        prop_assert!(got.iter().all(|b| start <= b.date && b.date <= end));

        let expected = bars.iter().filter(|b| start <= b.date && b.date <= end).count();
        prop_assert_eq!(got.len(), expected);
    }

    #[test]
    fn repeated_upserts_keep_one_row_per_date(
        offsets in prop::collection::btree_set(0u64..100, 1..40),
        repeats in 1usize..4,
    ) {
        let mut store = Store::open_in_memory().unwrap();
        let bars: Vec<PriceBar> = offsets
            .iter()
            .map(|&o| bar(base() + Days::new(o), 50.0))
            .collect();
        for _ in 0..repeats {
            store.upsert_bars(&bars).unwrap();
        }
        prop_assert_eq!(store.bars("SPY", None, None).unwrap().len(), offsets.len());
    }
}
