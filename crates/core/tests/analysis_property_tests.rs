//! Property-based integration tests for the analysis engine.
//!
//! These tests check history windowing identities and profit reconciliation
//! over randomly generated ledgers, using `proptest` for case generation.

use chrono::{Days, NaiveDate};
use ledger_analysis_core::analysis::AnalysisManager;
use ledger_analysis_core::buckets::{Bucket, BucketId, BucketKind};
use ledger_analysis_core::ledger::{
    Account, AccountGroup, AccountKind, GroupClassification, InMemoryLedger, Payee, Security,
    Transaction, TransactionKind,
};
use ledger_analysis_core::market_data::{ExchangeRate, Quote};
use ledger_analysis_core::values::Attribute;
use ledger_analysis_core::{AnalysisKey, AnalysisSettings};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Generators
// =============================================================================

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    origin().checked_add_days(Days::new(offset)).unwrap()
}

/// One generated feed entry: days since the previous entry, operation
/// selector, amount in cents and units.
#[derive(Debug, Clone)]
struct Op {
    step: u64,
    kind: u8,
    cents: i64,
    units: i64,
}

fn arb_op() -> impl Strategy<Value = Op> {
    (0u64..4, 0u8..5, -100_000i64..100_000, 1i64..20).prop_map(|(step, kind, cents, units)| Op {
        step,
        kind,
        cents,
        units,
    })
}

fn arb_ops(max_count: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(arb_op(), 0..=max_count)
}

/// Three EUR rates in the 0.80..1.60 range.
fn arb_rates() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(80i64..160, 3)
}

fn create_ledger(ops: &[Op], rates: &[i64]) -> InMemoryLedger {
    let group = |id: &str, kind| AccountGroup {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        classification: GroupClassification::Standard,
        sort_tag: None,
    };
    let account = |id: &str, group_id: &str, currency: &str| Account {
        id: id.to_string(),
        name: id.to_string(),
        group_id: group_id.to_string(),
        currency: currency.to_string(),
        sort_tag: None,
    };

    let mut offset = 0u64;
    let mut transactions = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        offset += op.step;
        let id = format!("t{}", i);
        let date = day(offset);
        let amount = Decimal::new(op.cents, 2);
        let magnitude = amount.abs().max(Decimal::new(1, 2));
        let units = Decimal::from(op.units);
        let tx = match op.kind {
            0 => Transaction::standard(id, date, "checking", amount).with_payee("shop"),
            1 => Transaction::standard(id, date, "savings-eur", amount).with_tag("travel"),
            2 => Transaction::transfer(id, date, "savings-eur", "checking", amount),
            3 => Transaction::trade(
                id,
                date,
                "broker",
                TransactionKind::Buy,
                "ACME",
                units,
                -magnitude,
            ),
            _ => Transaction::trade(
                id,
                date,
                "broker",
                TransactionKind::Sell,
                "ACME",
                units,
                magnitude,
            ),
        };
        transactions.push(tx);
    }

    InMemoryLedger {
        account_groups: vec![
            group("banks", AccountKind::Deposit),
            group("brokers", AccountKind::Portfolio),
        ],
        accounts: vec![
            account("checking", "banks", "USD"),
            account("savings-eur", "banks", "EUR"),
            account("broker", "brokers", "USD"),
        ],
        payees: vec![Payee {
            id: "shop".to_string(),
            name: "Shop".to_string(),
            payee_type: None,
            sort_tag: None,
        }],
        securities: vec![Security {
            id: "ACME".to_string(),
            name: "Acme Corp".to_string(),
            currency: "USD".to_string(),
            sort_tag: None,
        }],
        transactions,
        exchange_rates: rates
            .iter()
            .enumerate()
            .map(|(i, rate)| {
                ExchangeRate::new("EUR", "USD", Decimal::new(*rate, 2), day(i as u64 * 30))
            })
            .collect(),
        quotes: vec![
            Quote::new("ACME", day(10), Decimal::new(1234, 2)),
            Quote::new("ACME", day(45), Decimal::new(1567, 2)),
        ],
        ..Default::default()
    }
}

fn create_manager(ledger: InMemoryLedger) -> AnalysisManager {
    let ledger = Arc::new(ledger);
    AnalysisManager::new(
        AnalysisSettings::with_base_currency("USD"),
        ledger.clone(),
        ledger.clone(),
        ledger,
    )
    .unwrap()
}

/// Deposit bucket with one registered snapshot per generated amount.
fn create_bucket(ops: &[Op]) -> Bucket {
    let mut bucket = Bucket::tracked(
        BucketId::Account("checking".to_string()),
        BucketKind::Deposit,
        "Checking",
        "USD",
    );
    let mut offset = 0u64;
    for (i, op) in ops.iter().enumerate() {
        offset += op.step;
        let amount = Decimal::new(op.cents, 2);
        let tx = Transaction::standard(format!("t{}", i), day(offset), "checking", amount);
        let mut next = bucket.current().full_snapshot();
        next.add_money(Attribute::Balance, amount).unwrap();
        if amount > Decimal::ZERO {
            next.add_money(Attribute::Income, amount).unwrap();
        } else {
            next.add_money(Attribute::Expense, -amount).unwrap();
        }
        next.add_money(Attribute::Profit, amount).unwrap();
        bucket.register_transaction(&tx, next).unwrap();
    }
    bucket
}

const COUNTERS: [Attribute; 3] = [Attribute::Income, Attribute::Expense, Attribute::Profit];

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// **Property 1: windowing by date equals an open-started range**
    #[test]
    fn prop_window_by_date_equals_open_range(
        ops in arb_ops(40),
        cutoff in 0u64..120,
    ) {
        let bucket = create_bucket(&ops);
        let history = bucket.history().unwrap();
        let cutoff = day(cutoff);

        prop_assert_eq!(
            history.windowed_by_date(cutoff),
            history.windowed_by_range(NaiveDate::MIN, cutoff)
        );
    }

    /// **Property 2: counter deltas sum to current minus base**
    ///
    /// Holds for the full history and for every reconstructed range.
    #[test]
    fn prop_counter_deltas_sum_to_total_change(
        ops in arb_ops(40),
        a in 0u64..120,
        b in 0u64..120,
    ) {
        let bucket = create_bucket(&ops);
        let full = bucket.history().unwrap();
        let windowed = full.windowed_by_range(day(a.min(b)), day(a.max(b)));

        for history in [full, &windowed] {
            for attribute in COUNTERS {
                let summed: Decimal = history
                    .entries()
                    .iter()
                    .map(|e| e.delta_value(attribute).unwrap_or_default())
                    .sum();
                let total = history.current().delta(attribute, history.base()).unwrap_or_default();
                prop_assert_eq!(summed, total, "{} deltas do not sum up", attribute);
            }
        }
    }

    /// **Property 3: per-transaction delta equals values minus previous values**
    #[test]
    fn prop_delta_value_matches_snapshots(ops in arb_ops(30)) {
        let bucket = create_bucket(&ops);
        for i in 0..ops.len() {
            let id = format!("t{}", i);
            let values = bucket.values_for_transaction(&id).unwrap();
            let previous = bucket.previous_values_for_transaction(&id).unwrap();
            for attribute in COUNTERS {
                prop_assert_eq!(
                    bucket.delta_value(&id, attribute),
                    values.delta(attribute, &previous)
                );
            }
        }
    }

    /// **Property 4: an as-of history equals the scan of the truncated feed**
    ///
    /// Dropping every transaction after D and scanning again yields the
    /// same account and position histories and values as windowing the
    /// full scan at D.
    #[test]
    fn prop_as_of_equals_truncated_feed(
        ops in arb_ops(40),
        rates in arb_rates(),
        cutoff in 0u64..120,
    ) {
        let cutoff = day(cutoff);
        let full = create_ledger(&ops, &rates);
        let mut truncated = full.clone();
        truncated.transactions.retain(|tx| tx.date <= cutoff);

        let key = AnalysisKey::as_of(cutoff);
        let windowed = create_manager(full).get_analysis(key).unwrap();
        let rescanned = create_manager(truncated).get_analysis(key).unwrap();

        let buckets = rescanned.accounts().iter().chain(rescanned.positions().iter());
        for bucket in buckets {
            let id = bucket.id();
            let other = windowed.bucket(id);
            prop_assert!(other.is_some(), "{:?} missing from the windowed analysis", id);
            prop_assert_eq!(other.as_ref().and_then(|b| b.history()), bucket.history());
            prop_assert_eq!(windowed.current_values(id), rescanned.current_values(id));
        }
        for bucket in windowed.positions().iter() {
            if rescanned.bucket(bucket.id()).is_none() {
                let entries = bucket.history().map(|h| h.entries().len()).unwrap_or_default();
                prop_assert_eq!(entries, 0, "{:?} has entries after {}", bucket.id(), cutoff);
            }
        }
    }

    /// **Property 5: every analysis reconciles exactly**
    ///
    /// Account profit, payee profit, category profit and tax-basis gross
    /// agree for the full feed, an as-of date and an arbitrary range.
    #[test]
    fn prop_analyses_reconcile(
        ops in arb_ops(40),
        rates in arb_rates(),
        a in 0u64..120,
        b in 0u64..120,
    ) {
        let manager = create_manager(create_ledger(&ops, &rates));
        let keys = [
            AnalysisKey::Full,
            AnalysisKey::as_of(day(a)),
            AnalysisKey::range(day(a.min(b)), day(a.max(b))).unwrap(),
        ];

        for key in keys {
            let analysis = manager.get_analysis(key).unwrap();
            let report = analysis.reconciliation();
            prop_assert!(report.is_consistent(), "{} does not reconcile: {:?}", key, report);
        }
    }
}
