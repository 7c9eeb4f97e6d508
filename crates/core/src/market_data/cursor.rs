//! As-of-date cursors over reverse-chronological series.
//!
//! A cursor walks its series from the oldest point towards the newest, so it
//! must be queried with non-decreasing dates during one pass. Querying an
//! earlier date after a later one returns the later date's value. This is a
//! usage contract and is not checked.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::iter::{Peekable, Rev};
use std::slice;

use super::market_data_model::PricePoint;
use super::market_series::MarketSeries;

/// Stateful as-of-date lookup over one series.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    upcoming: Peekable<Rev<slice::Iter<'a, PricePoint>>>,
    current: Decimal,
    seeded: bool,
}

impl<'a> Cursor<'a> {
    /// `series` is newest first. `default` is effective before the oldest point.
    pub fn new(series: &'a [PricePoint], default: Decimal) -> Self {
        Cursor {
            upcoming: series.iter().rev().peekable(),
            current: default,
            seeded: false,
        }
    }

    /// Value effective at or before `date`.
    ///
    /// Advances past every change point dated on or before `date`: amortized
    /// O(1) per call over an ascending pass.
    pub fn value_at(&mut self, date: NaiveDate) -> Decimal {
        while let Some(point) = self.upcoming.next_if(|p| p.date <= date) {
            self.current = point.value;
            self.seeded = true;
        }
        self.current
    }

    /// Like [`Cursor::value_at`], but `None` while only the default applies.
    pub fn known_at(&mut self, date: NaiveDate) -> Option<Decimal> {
        let value = self.value_at(date);
        self.seeded.then_some(value)
    }

    /// Value returned by the last query, or the default before any.
    pub fn current(&self) -> Decimal {
        self.current
    }

    /// Date of the next change point not yet passed.
    pub fn next_change(&mut self) -> Option<NaiveDate> {
        self.upcoming.peek().map(|p| p.date)
    }
}

/// Lazily created cursors, one per key.
#[derive(Debug)]
pub struct CursorSet<'a> {
    series: &'a HashMap<String, Vec<PricePoint>>,
    identity_key: Option<&'a str>,
    default: Decimal,
    cursors: HashMap<String, Cursor<'a>>,
}

impl<'a> CursorSet<'a> {
    pub fn new(
        series: &'a HashMap<String, Vec<PricePoint>>,
        identity_key: Option<&'a str>,
        default: Decimal,
    ) -> Self {
        CursorSet {
            series,
            identity_key,
            default,
            cursors: HashMap::new(),
        }
    }

    /// Rates into the base currency. The base currency itself is always 1.
    pub fn rates(market: &'a MarketSeries) -> Self {
        Self::new(market.rates(), Some(market.base_currency()), Decimal::ONE)
    }

    /// Closing prices. One whole unit before the first known quote.
    pub fn prices(market: &'a MarketSeries) -> Self {
        Self::new(market.prices(), None, Decimal::ONE)
    }

    fn cursor(&mut self, key: &str) -> &mut Cursor<'a> {
        let series = self.series;
        let default = self.default;
        self.cursors.entry(key.to_string()).or_insert_with(|| {
            let points = series.get(key).map(Vec::as_slice).unwrap_or(&[]);
            Cursor::new(points, default)
        })
    }

    /// Value for `key` effective at `date`. See [`Cursor::value_at`].
    pub fn value_at(&mut self, key: &str, date: NaiveDate) -> Decimal {
        if self.identity_key == Some(key) {
            return Decimal::ONE;
        }
        self.cursor(key).value_at(date)
    }

    /// Value for `key` at `date` if a known point is effective.
    pub fn known_at(&mut self, key: &str, date: NaiveDate) -> Option<Decimal> {
        if self.identity_key == Some(key) {
            return Some(Decimal::ONE);
        }
        self.cursor(key).known_at(date)
    }

    /// True when the key has at least one known point.
    pub fn has_series(&self, key: &str) -> bool {
        self.series.get(key).is_some_and(|s| !s.is_empty())
    }
}
