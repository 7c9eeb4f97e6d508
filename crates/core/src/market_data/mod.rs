//! Market data module - price/rate series and as-of-date cursors.

mod cursor;
mod market_data_model;
mod market_series;

pub use cursor::{Cursor, CursorSet};
pub use market_data_model::{ExchangeRate, PricePoint, Quote};
pub use market_series::MarketSeries;

#[cfg(test)]
mod cursor_tests;
