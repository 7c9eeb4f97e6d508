#[cfg(test)]
mod tests {
    use crate::market_data::{Cursor, CursorSet, ExchangeRate, MarketSeries, PricePoint, Quote};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cursor_ascending_queries() {
        // Newest first.
        let series = vec![
            PricePoint::new(date(2020, 6, 1), dec!(1.20)),
            PricePoint::new(date(2020, 1, 1), dec!(1.10)),
        ];
        let mut cursor = Cursor::new(&series, Decimal::ONE);

        assert_eq!(cursor.value_at(date(2019, 12, 31)), dec!(1.0));
        assert_eq!(cursor.value_at(date(2020, 1, 1)), dec!(1.10));
        assert_eq!(cursor.value_at(date(2020, 5, 1)), dec!(1.10));
        assert_eq!(cursor.value_at(date(2020, 7, 1)), dec!(1.20));
    }

    #[test]
    fn test_cursor_next_change_tracks_buffered_point() {
        let series = vec![
            PricePoint::new(date(2020, 6, 1), dec!(1.20)),
            PricePoint::new(date(2020, 1, 1), dec!(1.10)),
        ];
        let mut cursor = Cursor::new(&series, Decimal::ONE);

        assert_eq!(cursor.next_change(), Some(date(2020, 1, 1)));
        cursor.value_at(date(2020, 3, 1));
        assert_eq!(cursor.next_change(), Some(date(2020, 6, 1)));
        assert_eq!(cursor.current(), dec!(1.10));
        cursor.value_at(date(2021, 1, 1));
        assert_eq!(cursor.next_change(), None);
    }

    #[test]
    fn test_cursor_skips_several_points_in_one_query() {
        let series = vec![
            PricePoint::new(date(2020, 3, 1), dec!(3)),
            PricePoint::new(date(2020, 2, 1), dec!(2)),
            PricePoint::new(date(2020, 1, 1), dec!(1.5)),
        ];
        let mut cursor = Cursor::new(&series, dec!(1));
        assert_eq!(cursor.value_at(date(2020, 2, 15)), dec!(2));
        assert_eq!(cursor.value_at(date(2020, 2, 15)), dec!(2));
        assert_eq!(cursor.value_at(date(2020, 3, 1)), dec!(3));
    }

    #[test]
    fn test_cursor_empty_series_returns_default() {
        let mut cursor = Cursor::new(&[], dec!(1));
        assert_eq!(cursor.value_at(date(2024, 1, 1)), dec!(1));
        assert_eq!(cursor.next_change(), None);
    }

    #[test]
    fn test_market_series_inverts_rates_quoted_from_base() {
        let market = MarketSeries::new(
            "USD",
            vec![
                ExchangeRate::new("EUR", "USD", dec!(1.10), date(2020, 1, 1)),
                ExchangeRate::new("USD", "GBP", dec!(0.80), date(2020, 1, 1)),
                ExchangeRate::new("EUR", "GBP", dec!(0.85), date(2020, 1, 1)),
            ],
            vec![],
        );

        assert_eq!(market.rate_series("EUR").len(), 1);
        assert_eq!(market.rate_series("GBP")[0].value, dec!(1.25));
        assert!(market.rate_series("CHF").is_empty());
    }

    #[test]
    fn test_market_series_orders_newest_first() {
        let market = MarketSeries::new(
            "USD",
            vec![],
            vec![
                Quote::new("AAPL", date(2020, 1, 1), dec!(100)),
                Quote::new("AAPL", date(2020, 3, 1), dec!(120)),
                Quote::new("AAPL", date(2020, 2, 1), dec!(110)),
            ],
        );

        let dates: Vec<NaiveDate> = market.price_series("AAPL").iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2020, 3, 1), date(2020, 2, 1), date(2020, 1, 1)]);
    }

    #[test]
    fn test_cursor_set_base_currency_is_identity() {
        let market = MarketSeries::new(
            "USD",
            vec![ExchangeRate::new("EUR", "USD", dec!(1.10), date(2020, 1, 1))],
            vec![],
        );
        let mut rates = CursorSet::rates(&market);

        assert_eq!(rates.value_at("USD", date(2020, 6, 1)), Decimal::ONE);
        assert_eq!(rates.value_at("EUR", date(2019, 6, 1)), Decimal::ONE);
        assert_eq!(rates.value_at("EUR", date(2020, 6, 1)), dec!(1.10));
        assert_eq!(rates.value_at("JPY", date(2020, 6, 1)), Decimal::ONE);
        assert!(rates.has_series("EUR"));
        assert!(!rates.has_series("JPY"));
    }

    #[test]
    fn test_known_at_is_none_before_first_point() {
        let market = MarketSeries::new(
            "USD",
            vec![],
            vec![Quote::new("AAPL", date(2020, 2, 1), dec!(150))],
        );
        let mut prices = CursorSet::prices(&market);

        assert_eq!(prices.known_at("AAPL", date(2020, 1, 1)), None);
        assert_eq!(prices.known_at("AAPL", date(2020, 2, 1)), Some(dec!(150)));
        assert_eq!(prices.known_at("MSFT", date(2020, 2, 1)), None);
    }
}
