//! Tests for Values copy modes, deltas and typed accessors.

#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use crate::values::{Attribute, AttributeKind, Value, ValueLayout, Values};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn card_values() -> Values {
        let mut values = Values::new(ValueLayout::CreditCard);
        values.set_money(Attribute::Balance, dec!(-80.00)).unwrap();
        values.set_money(Attribute::Expense, dec!(80.00)).unwrap();
        values.set_money(Attribute::Spend, dec!(80.00)).unwrap();
        values.set_rate(Attribute::ExchangeRate, dec!(1)).unwrap();
        values
            .set_date(
                Attribute::LastActivity,
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
            .unwrap();
        values
    }

    #[test]
    fn test_new_values_are_zeroed_and_dates_absent() {
        let values = Values::new(ValueLayout::Position);
        assert_eq!(values.get(Attribute::Units), Some(Value::Units(Decimal::ZERO)));
        assert_eq!(values.get(Attribute::Price), Some(Value::Rate(Decimal::ZERO)));
        assert_eq!(values.get(Attribute::LastActivity), None);
        assert_eq!(values.get(Attribute::Balance), None);
    }

    #[test]
    fn test_set_rejects_attribute_outside_layout() {
        let mut values = Values::new(ValueLayout::Flow);
        let err = values.set_money(Attribute::Balance, dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedAttribute {
                attribute: Attribute::Balance,
                layout: ValueLayout::Flow
            }
        ));
    }

    #[test]
    fn test_typed_accessor_fails_fast_on_kind_mismatch() {
        let values = Values::new(ValueLayout::Position);
        let err = values.money(Attribute::Units).unwrap_err();
        match err {
            Error::InvalidAttribute {
                attribute,
                expected,
                found,
            } => {
                assert_eq!(attribute, Attribute::Units);
                assert_eq!(expected, AttributeKind::Units);
                assert_eq!(found, AttributeKind::Money);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Absent is not an error.
        assert_eq!(values.date(Attribute::LastActivity).unwrap(), None);
    }

    #[test]
    fn test_set_rejects_value_of_wrong_kind() {
        let mut values = Values::new(ValueLayout::Account);
        let err = values
            .set(Attribute::Balance, Value::Units(dec!(3)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { .. }));
    }

    #[test]
    fn test_counter_snapshot_drops_state_and_restarts_period_counters() {
        let values = card_values();
        let counters = values.counter_snapshot();

        assert_eq!(counters.get(Attribute::Balance), None);
        assert_eq!(counters.get(Attribute::LastActivity), None);
        assert_eq!(counters.money(Attribute::Expense).unwrap(), Some(dec!(80.00)));
        assert_eq!(counters.money(Attribute::Spend).unwrap(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_full_snapshot_is_independent_of_later_arithmetic() {
        let mut source = card_values();
        let copy = source.full_snapshot();

        source.add_money(Attribute::Expense, dec!(20.00)).unwrap();

        assert_eq!(copy.money(Attribute::Expense).unwrap(), Some(dec!(80.00)));
        assert_eq!(source.money(Attribute::Expense).unwrap(), Some(dec!(100.00)));
    }

    #[test]
    fn test_delta_is_none_for_instantaneous_attributes() {
        let current = card_values();
        let base = Values::new(ValueLayout::CreditCard);

        assert_eq!(current.delta(Attribute::Balance, &base), None);
        assert_eq!(current.delta(Attribute::ExchangeRate, &base), None);
        assert_eq!(current.delta(Attribute::Expense, &base), Some(dec!(80.00)));
    }

    #[test]
    fn test_delta_treats_absent_other_as_zero() {
        let current = card_values();
        let empty = Values::new(ValueLayout::Flow);
        assert_eq!(current.delta(Attribute::Spend, &empty), Some(dec!(80.00)));
    }

    #[test]
    fn test_adjust_to_base_subtracts_counters_only() {
        let mut base = Values::new(ValueLayout::CreditCard);
        base.set_money(Attribute::Balance, dec!(-50.00)).unwrap();
        base.set_money(Attribute::Expense, dec!(50.00)).unwrap();
        base.set_money(Attribute::Spend, dec!(50.00)).unwrap();

        let mut values = card_values();
        values.adjust_to_base(&base);

        assert_eq!(values.money(Attribute::Balance).unwrap(), Some(dec!(-80.00)));
        assert_eq!(values.money(Attribute::Expense).unwrap(), Some(dec!(30.00)));
        assert_eq!(values.money(Attribute::Spend).unwrap(), Some(dec!(30.00)));
    }

    #[test]
    fn test_reset_counters_keeps_state() {
        let mut values = card_values();
        values.reset_counters();
        assert_eq!(values.money(Attribute::Balance).unwrap(), Some(dec!(-80.00)));
        assert_eq!(values.money(Attribute::Expense).unwrap(), Some(Decimal::ZERO));
        assert_eq!(values.money(Attribute::Spend).unwrap(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_add_sums_base_money_but_not_local_amounts() {
        let mut total = Values::new(ValueLayout::Aggregate);
        let mut child = Values::new(ValueLayout::Account);
        child.set_money(Attribute::Balance, dec!(500)).unwrap();
        child.set_money(Attribute::Valuation, dec!(550)).unwrap();
        child.set_money(Attribute::Income, dec!(25)).unwrap();

        total.add(&child);
        total.add(&child);

        assert_eq!(total.money(Attribute::Valuation).unwrap(), Some(dec!(1100)));
        assert_eq!(total.money(Attribute::Income).unwrap(), Some(dec!(50)));
        assert_eq!(total.get(Attribute::Balance), None);
    }
}
