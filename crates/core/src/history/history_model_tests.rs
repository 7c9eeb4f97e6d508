#[cfg(test)]
mod tests {
    use crate::errors::{Error, HistoryError};
    use crate::history::{History, Window};
    use crate::ledger::Transaction;
    use crate::values::{Attribute, ValueLayout, Values};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income(id: &str, on: NaiveDate, amount: Decimal) -> Transaction {
        Transaction::standard(id, on, "acc", amount)
    }

    /// Applies an income amount on top of the history's current state.
    fn apply(history: &mut History, tx: &Transaction) {
        let mut next = history.current().full_snapshot();
        next.add_money(Attribute::Balance, tx.amount).unwrap();
        next.add_money(Attribute::Income, tx.amount).unwrap();
        next.set_date(Attribute::LastActivity, tx.date).unwrap();
        history.register_transaction(tx, next).unwrap();
    }

    fn sample() -> History {
        let mut history = History::new(Values::new(ValueLayout::Account));
        apply(&mut history, &income("t1", date(2024, 1, 10), dec!(100)));
        apply(&mut history, &income("t2", date(2024, 2, 1), dec!(20)));
        apply(&mut history, &income("t3", date(2024, 2, 15), dec!(5)));
        apply(&mut history, &income("t4", date(2024, 3, 1), dec!(1)));
        history
    }

    fn income_of(values: &Values) -> Decimal {
        values.money_or_zero(Attribute::Income).unwrap()
    }

    #[test]
    fn test_lookup_by_transaction_id() {
        let history = sample();
        assert_eq!(history.len(), 4);
        assert!(!history.is_idle());

        let own = history.values_for_transaction("t2").unwrap();
        let previous = history.previous_values_for_transaction("t2").unwrap();
        assert_eq!(income_of(own), dec!(120));
        assert_eq!(income_of(previous), dec!(100));
        assert_eq!(history.delta_value("t2", Attribute::Income), Some(dec!(20)));

        assert!(history.values_for_transaction("missing").is_none());
        assert_eq!(history.delta_value("missing", Attribute::Income), None);
    }

    #[test]
    fn test_delta_value_matches_own_minus_previous() {
        let history = sample();
        for entry in history.entries() {
            let id = entry.transaction_id();
            let own = income_of(history.values_for_transaction(id).unwrap());
            let previous = income_of(history.previous_values_for_transaction(id).unwrap());
            assert_eq!(history.delta_value(id, Attribute::Income), Some(own - previous));
        }
    }

    #[test]
    fn test_counter_deltas_sum_to_current_minus_base() {
        let history = sample();
        let summed: Decimal = history
            .entries()
            .iter()
            .filter_map(|e| e.delta_value(Attribute::Income))
            .sum();
        let total = history.current().delta(Attribute::Income, history.base());
        assert_eq!(total, Some(summed));
    }

    #[test]
    fn test_instantaneous_delta_is_none() {
        let history = sample();
        assert_eq!(history.delta_value("t1", Attribute::Balance), None);
        let snapshot = history.snapshot("t1").unwrap();
        assert_eq!(snapshot.delta_money_value(Attribute::Balance).unwrap(), dec!(100));
        assert!(matches!(
            snapshot.delta_units_value(Attribute::Balance),
            Err(Error::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_order_registration() {
        let mut history = sample();
        let late = income("t0", date(2024, 1, 1), dec!(1));
        let next = history.current().full_snapshot();
        let err = history.register_transaction(&late, next).unwrap_err();
        assert!(matches!(err, Error::History(HistoryError::OutOfOrder { .. })));
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_rejects_duplicate_registration() {
        let mut history = sample();
        let again = income("t4", date(2024, 3, 1), dec!(1));
        let next = history.current().full_snapshot();
        let err = history.register_transaction(&again, next).unwrap_err();
        assert!(matches!(
            err,
            Error::History(HistoryError::DuplicateTransaction(ref id)) if id == "t4"
        ));
    }

    #[test]
    fn test_rejects_layout_mismatch() {
        let mut history = sample();
        let tx = income("t5", date(2024, 4, 1), dec!(1));
        let err = history
            .register_transaction(&tx, Values::new(ValueLayout::Flow))
            .unwrap_err();
        assert!(matches!(err, Error::History(HistoryError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_windowed_by_date_truncates() {
        let history = sample();
        let windowed = history.windowed_by_date(date(2024, 2, 10));
        assert_eq!(windowed.len(), 2);
        assert_eq!(income_of(windowed.current()), dec!(120));
        assert_eq!(windowed.base(), history.base());
        assert!(windowed.values_for_transaction("t3").is_none());
    }

    #[test]
    fn test_degenerate_window_is_base() {
        let history = sample();
        let before = history.windowed_by_date(date(2023, 12, 31));
        assert!(before.is_idle());
        assert_eq!(before.current(), history.base());

        let empty_range = history.windowed_by_range(date(2024, 1, 11), date(2024, 1, 31));
        assert!(empty_range.is_idle());
        assert_eq!(income_of(empty_range.current()), Decimal::ZERO);
        assert_eq!(
            empty_range.current().money(Attribute::Balance).unwrap(),
            Some(dec!(100))
        );
    }

    #[test]
    fn test_range_entry_on_start_is_counted_once() {
        let history = sample();
        let february = history.windowed_by_range(date(2024, 2, 1), date(2024, 2, 29));

        // t2 falls exactly on start: it is in the window, the anchor is t1.
        assert_eq!(february.len(), 2);
        assert!(february.values_for_transaction("t2").is_some());
        assert_eq!(february.delta_value("t2", Attribute::Income), Some(dec!(20)));
        assert_eq!(income_of(february.current()), dec!(25));
        assert_eq!(income_of(february.base()), Decimal::ZERO);
        assert_eq!(
            february.base().money(Attribute::Balance).unwrap(),
            Some(dec!(100))
        );
        assert_eq!(
            february.current().money(Attribute::Balance).unwrap(),
            Some(dec!(125))
        );
    }

    #[test]
    fn test_range_end_is_inclusive() {
        let history = sample();
        let window = history.windowed_by_range(date(2024, 2, 2), date(2024, 3, 1));
        assert_eq!(window.len(), 2);
        assert_eq!(income_of(window.current()), dec!(6));
        assert_eq!(
            window.current().date(Attribute::LastActivity).unwrap(),
            Some(date(2024, 3, 1))
        );
    }

    #[test]
    fn test_window_by_date_equals_open_range() {
        let history = sample();
        for cutoff in [
            date(2023, 12, 1),
            date(2024, 1, 10),
            date(2024, 2, 1),
            date(2024, 2, 20),
            date(2024, 12, 31),
        ] {
            assert_eq!(
                history.windowed_by_date(cutoff),
                history.windowed_by_range(NaiveDate::MIN, cutoff)
            );
        }
    }

    #[test]
    fn test_windowed_dispatch() {
        let history = sample();
        assert_eq!(history.windowed(&Window::Full), history);
        assert_eq!(
            history.windowed(&Window::Until(date(2024, 2, 1))),
            history.windowed_by_date(date(2024, 2, 1))
        );
    }

    #[test]
    fn test_derived_starts_from_counters() {
        let history = sample();
        let derived = History::derived(history.current());
        assert!(derived.is_idle());
        assert_eq!(income_of(derived.current()), dec!(126));
        assert_eq!(derived.current().money(Attribute::Balance).unwrap(), None);
        assert_eq!(
            derived.base().money(Attribute::Balance).unwrap(),
            Some(dec!(126))
        );
    }
}
