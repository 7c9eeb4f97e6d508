#[cfg(test)]
mod tests {
    use crate::buckets::{Bucket, BucketExtension, BucketId, BucketKind, BucketList};
    use crate::history::Window;
    use crate::ledger::Transaction;
    use crate::values::{Attribute, ValueLayout};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Posts an amount the way the ledger scanner does for a base-currency
    /// account: balance, valuation and extension bookkeeping.
    fn post(bucket: &mut Bucket, tx: &Transaction) {
        let mut next = bucket.current().full_snapshot();
        next.add_money(Attribute::Balance, tx.amount).unwrap();
        let balance = next.money_or_zero(Attribute::Balance).unwrap();
        next.set_money(Attribute::Valuation, balance).unwrap();
        if let Some(extension) = bucket.extension() {
            extension.on_posting(&mut next, tx.amount).unwrap();
        }
        bucket.register_transaction(tx, next).unwrap();
    }

    fn credit_card() -> Bucket {
        Bucket::tracked(
            BucketId::Account("card".to_string()),
            BucketKind::Loan,
            "Card",
            "USD",
        )
        .with_extension(BucketExtension::CreditCard)
    }

    #[test]
    fn test_credit_card_spend_counts_debits_only() {
        let mut card = credit_card();
        post(&mut card, &Transaction::standard("t1", date(2024, 1, 5), "card", dec!(-50.00)));
        post(&mut card, &Transaction::standard("t2", date(2024, 1, 9), "card", dec!(-30.00)));
        post(&mut card, &Transaction::standard("t3", date(2024, 1, 20), "card", dec!(20.00)));

        assert_eq!(card.current().money(Attribute::Spend).unwrap(), Some(dec!(80.00)));
        assert_eq!(card.delta(Attribute::Spend), Some(dec!(80.00)));
        assert_eq!(card.valuation_delta(), dec!(-60.00));
    }

    #[test]
    fn test_credit_card_spend_restarts_in_new_period() {
        let mut card = credit_card();
        post(&mut card, &Transaction::standard("t1", date(2024, 1, 5), "card", dec!(-50.00)));

        let next_period = card.current().counter_snapshot();
        assert_eq!(next_period.money(Attribute::Spend).unwrap(), Some(Decimal::ZERO));
        assert_eq!(next_period.money(Attribute::Balance).unwrap(), None);
    }

    #[test]
    fn test_credit_card_spend_in_windowed_delta() {
        let mut card = credit_card();
        post(&mut card, &Transaction::standard("t1", date(2024, 1, 5), "card", dec!(-50.00)));
        post(&mut card, &Transaction::standard("t2", date(2024, 2, 5), "card", dec!(-30.00)));

        let february = card.windowed(&Window::Between {
            start: date(2024, 2, 1),
            end: date(2024, 2, 29),
        });
        assert_eq!(february.delta(Attribute::Spend), Some(dec!(30.00)));
        assert_eq!(february.valuation_delta(), dec!(-30.00));
        assert_eq!(february.delta_value("t2", Attribute::Spend), Some(dec!(30.00)));
        assert_eq!(february.values_for_transaction("t1"), None);
    }

    #[test]
    fn test_extension_selects_layout() {
        assert_eq!(credit_card().current().layout(), ValueLayout::CreditCard);
        let plain = Bucket::new(
            BucketId::Account("a".to_string()),
            BucketKind::Loan,
            "Loan",
            "USD",
        );
        assert_eq!(plain.current().layout(), ValueLayout::Account);
        assert_eq!(plain.current().money(Attribute::Spend).unwrap(), None);
    }

    #[test]
    fn test_merge_adds_current_and_base_independently() {
        let mut total = Bucket::aggregate(
            BucketId::KindTotal(BucketKind::Cash),
            BucketKind::Cash,
            "Cash",
            "USD",
        );

        let mut a = Bucket::new(BucketId::Account("a".into()), BucketKind::Cash, "A", "USD");
        let mut current = a.current().full_snapshot();
        current.set_money(Attribute::Valuation, dec!(150)).unwrap();
        current.set_money(Attribute::Income, dec!(50)).unwrap();
        a.replace_current(current);
        let mut base = a.base().full_snapshot();
        base.set_money(Attribute::Valuation, dec!(100)).unwrap();
        a.replace_base(base);

        let mut b = Bucket::new(BucketId::Account("b".into()), BucketKind::Cash, "B", "EUR");
        let mut current = b.current().full_snapshot();
        current.set_money(Attribute::Valuation, dec!(20)).unwrap();
        b.replace_current(current);
        b.set_has_foreign_currency(true);

        total.merge(&a);
        total.merge(&b);

        assert_eq!(total.current().money(Attribute::Valuation).unwrap(), Some(dec!(170)));
        assert_eq!(total.base().money(Attribute::Valuation).unwrap(), Some(dec!(100)));
        assert_eq!(total.valuation_delta(), dec!(70));
        assert_eq!(total.delta(Attribute::Income), Some(dec!(50)));
        assert!(total.has_foreign_currency());
        assert_eq!(total.children().len(), 2);
    }

    #[test]
    fn test_equality_delegates_to_identity() {
        let a = Bucket::new(BucketId::Payee("p".into()), BucketKind::Payee, "One", "USD");
        let mut b = Bucket::new(BucketId::Payee("p".into()), BucketKind::Payee, "Two", "USD");
        let mut values = b.current().full_snapshot();
        values.set_money(Attribute::Income, dec!(1)).unwrap();
        b.replace_current(values);
        assert_eq!(a, b);

        let c = Bucket::new(BucketId::Payee("q".into()), BucketKind::Payee, "One", "USD");
        assert!(a < c);
    }

    #[test]
    fn test_untracked_bucket_is_idle() {
        let bucket = Bucket::new(BucketId::Tag("t".into()), BucketKind::Tag, "t", "USD");
        assert!(bucket.is_idle());
        assert!(bucket.history().is_none());
        assert_eq!(bucket.values_for_transaction("x"), None);
    }

    #[test]
    fn test_list_get_or_orphan_does_not_register() {
        let mut list = BucketList::new();
        list.insert(Bucket::new(BucketId::Payee("known".into()), BucketKind::Payee, "Known", "USD"));

        let known = list.get_or_orphan(&BucketId::Payee("known".into()), BucketKind::Payee, "USD");
        assert!(matches!(known, Cow::Borrowed(_)));

        let missing = BucketId::Payee("missing".into());
        let orphan = list.get_or_orphan(&missing, BucketKind::Payee, "USD");
        assert!(matches!(orphan, Cow::Owned(_)));
        assert_eq!(orphan.id(), &missing);
        assert!(orphan.is_idle());
        assert!(!list.contains(&missing));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_list_sort_by_tag_then_name() {
        let mut list: BucketList = vec![
            Bucket::new(BucketId::Category("c".into()), BucketKind::Category, "Zeta", "USD"),
            Bucket::new(BucketId::Category("b".into()), BucketKind::Category, "Beta", "USD")
                .with_sort_tag(Some("2".into())),
            Bucket::new(BucketId::Category("a".into()), BucketKind::Category, "Alpha", "USD")
                .with_sort_tag(Some("2".into())),
            Bucket::new(BucketId::Category("d".into()), BucketKind::Category, "Delta", "USD")
                .with_sort_tag(Some("1".into())),
        ]
        .into_iter()
        .collect();

        list.sort_by_tag();

        let names: Vec<&str> = list.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["Delta", "Alpha", "Beta", "Zeta"]);
        assert_eq!(
            list.get(&BucketId::Category("b".into())).map(|b| b.name()),
            Some("Beta")
        );
    }

    #[test]
    fn test_list_ensure_inserts_once() {
        let mut list = BucketList::new();
        let id = BucketId::Tag("travel".into());
        list.ensure(&id, || Bucket::new(id.clone(), BucketKind::Tag, "travel", "USD"));
        list.ensure(&id, || panic!("must not rebuild an existing bucket"));
        assert_eq!(list.len(), 1);
    }
}
