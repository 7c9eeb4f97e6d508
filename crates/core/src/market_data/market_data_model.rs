//! Market data domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One change point of a price or rate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        PricePoint { date, value }
    }
}

/// Exchange rate effective from `date`: one unit of `from_currency` is worth
/// `rate` units of `to_currency`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub date: NaiveDate,
}

impl ExchangeRate {
    pub fn new(from: &str, to: &str, rate: Decimal, date: NaiveDate) -> Self {
        ExchangeRate {
            id: Self::make_pair_key(from, to),
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
            date,
        }
    }

    /// Returns format: "FX:EUR/USD"
    pub fn make_pair_key(from: &str, to: &str) -> String {
        format!("FX:{}/{}", from, to)
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(6);
    serializer.serialize_str(&rounded.to_string())
}

/// Closing price of a security, in the security's currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub security_id: String,
    pub date: NaiveDate,
    pub close: Decimal,
}

impl Quote {
    pub fn new(security_id: &str, date: NaiveDate, close: Decimal) -> Self {
        Quote {
            security_id: security_id.to_string(),
            date,
            close,
        }
    }
}
