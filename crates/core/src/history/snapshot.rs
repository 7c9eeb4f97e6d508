//! Immutable value state bound to one transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::ledger::Transaction;
use crate::values::{Attribute, AttributeKind, Values};

/// Value state of a bucket right after one transaction was applied, together
/// with the state right before it.
///
/// Snapshots are keyed by transaction id and causally ordered by transaction
/// date. The previous state is shared with the prior snapshot, not copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    transaction_id: String,
    date: NaiveDate,
    values: Arc<Values>,
    previous: Arc<Values>,
}

impl Snapshot {
    /// Captures `applied` as the state produced by `transaction`.
    pub fn capture(transaction: &Transaction, applied: Values, previous: Arc<Values>) -> Self {
        Snapshot {
            transaction_id: transaction.id.clone(),
            date: transaction.date,
            values: Arc::new(applied),
            previous,
        }
    }

    /// Re-expresses this snapshot relative to a new base, linked to a new
    /// previous state. Counters become relative to `base`.
    pub fn rebase(&self, base: &Values, previous: Arc<Values>) -> Self {
        let mut values = self.values.full_snapshot();
        values.adjust_to_base(base);
        Snapshot {
            transaction_id: self.transaction_id.clone(),
            date: self.date,
            values: Arc::new(values),
            previous,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn previous_values(&self) -> &Values {
        &self.previous
    }

    pub(crate) fn shared_values(&self) -> Arc<Values> {
        Arc::clone(&self.values)
    }

    /// Counter delta introduced by this transaction. See [`Values::delta`].
    pub fn delta_value(&self, attribute: Attribute) -> Option<Decimal> {
        self.values.delta(attribute, &self.previous)
    }

    fn typed_delta(&self, attribute: Attribute, requested: AttributeKind) -> Result<Decimal> {
        if attribute.kind() != requested {
            return Err(Error::InvalidAttribute {
                attribute,
                expected: attribute.kind(),
                found: requested,
            });
        }
        let numeric = |values: &Values| {
            values
                .get(attribute)
                .and_then(|v| v.as_decimal())
                .unwrap_or_default()
        };
        Ok(numeric(&self.values) - numeric(&self.previous))
    }

    /// `current - previous` for any money attribute, counters and balances
    /// alike. An absent previous value is a zero baseline.
    pub fn delta_money_value(&self, attribute: Attribute) -> Result<Decimal> {
        self.typed_delta(attribute, AttributeKind::Money)
    }

    pub fn delta_units_value(&self, attribute: Attribute) -> Result<Decimal> {
        self.typed_delta(attribute, AttributeKind::Units)
    }
}
