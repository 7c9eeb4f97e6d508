//! Per-key price and rate series, grouped once per manager.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::market_data_model::{ExchangeRate, PricePoint, Quote};

/// Reverse-chronological series keyed by currency code (rates into the base
/// currency) and by security id (closing prices).
#[derive(Debug, Clone, Default)]
pub struct MarketSeries {
    base_currency: String,
    rates: HashMap<String, Vec<PricePoint>>,
    prices: HashMap<String, Vec<PricePoint>>,
}

fn into_reverse_series(
    points: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
) -> HashMap<String, Vec<PricePoint>> {
    points
        .into_iter()
        .map(|(key, by_date)| {
            let series = by_date
                .into_iter()
                .rev()
                .map(|(date, value)| PricePoint::new(date, value))
                .collect();
            (key, series)
        })
        .collect()
}

impl MarketSeries {
    /// Groups raw rates and quotes.
    ///
    /// Rates quoted from the base currency are stored inverted. Pairs not
    /// involving the base currency, and zero rates, are ignored. A later
    /// record for the same key and date replaces an earlier one.
    pub fn new(base_currency: &str, rates: Vec<ExchangeRate>, quotes: Vec<Quote>) -> Self {
        let mut rate_points: HashMap<String, BTreeMap<NaiveDate, Decimal>> = HashMap::new();
        let mut ignored = 0usize;
        for rate in rates {
            if rate.rate.is_zero() || rate.from_currency == rate.to_currency {
                ignored += 1;
                continue;
            }
            let (key, value) = if rate.to_currency == base_currency {
                (rate.from_currency, rate.rate)
            } else if rate.from_currency == base_currency {
                (rate.to_currency, Decimal::ONE / rate.rate)
            } else {
                ignored += 1;
                continue;
            };
            rate_points.entry(key).or_default().insert(rate.date, value);
        }
        if ignored > 0 {
            debug!(
                "Ignored {} exchange rates not convertible into {}",
                ignored, base_currency
            );
        }

        let mut price_points: HashMap<String, BTreeMap<NaiveDate, Decimal>> = HashMap::new();
        for quote in quotes {
            price_points
                .entry(quote.security_id)
                .or_default()
                .insert(quote.date, quote.close);
        }

        MarketSeries {
            base_currency: base_currency.to_string(),
            rates: into_reverse_series(rate_points),
            prices: into_reverse_series(price_points),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn rates(&self) -> &HashMap<String, Vec<PricePoint>> {
        &self.rates
    }

    pub fn prices(&self) -> &HashMap<String, Vec<PricePoint>> {
        &self.prices
    }

    /// Newest-first rate series converting `currency` into the base currency.
    pub fn rate_series(&self, currency: &str) -> &[PricePoint] {
        self.rates.get(currency).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn price_series(&self, security_id: &str) -> &[PricePoint] {
        self.prices.get(security_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
