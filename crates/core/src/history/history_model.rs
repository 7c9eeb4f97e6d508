//! Ordered snapshot history of one bucket, and its windowed reconstructions.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::snapshot::Snapshot;
use crate::errors::{HistoryError, Result};
use crate::ledger::Transaction;
use crate::values::{Attribute, Values};

/// Time window a history can be reconstructed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// Every entry.
    Full,
    /// Entries dated on or before the cutoff.
    Until(NaiveDate),
    /// Entries dated within `[start, end]`, both inclusive.
    Between { start: NaiveDate, end: NaiveDate },
}

/// Append-only snapshot sequence of one bucket.
///
/// Snapshots are stored in non-decreasing date order and indexed by
/// transaction id, so per-transaction lookups are O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    base: Arc<Values>,
    current: Arc<Values>,
    entries: Vec<Snapshot>,
    index: HashMap<String, usize>,
}

impl History {
    /// Wraps an initial value state. The base also serves as current until the
    /// first transaction is registered.
    pub fn new(base: Values) -> Self {
        let base = Arc::new(base.full_snapshot());
        History {
            current: Arc::clone(&base),
            base,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// New aggregation context over an existing base: the base is copied in
    /// full, current starts as its counter-only snapshot.
    pub fn derived(base: &Values) -> Self {
        History {
            base: Arc::new(base.full_snapshot()),
            current: Arc::new(base.counter_snapshot()),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn base(&self) -> &Values {
        &self.base
    }

    pub fn current(&self) -> &Values {
        &self.current
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff no transaction ever touched this bucket.
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.date())
    }

    /// Appends the state produced by `transaction`.
    ///
    /// Must be called once per touching transaction, in ascending date order.
    pub fn register_transaction(&mut self, transaction: &Transaction, applied: Values) -> Result<()> {
        if applied.layout() != self.base.layout() {
            return Err(HistoryError::LayoutMismatch {
                expected: self.base.layout(),
                found: applied.layout(),
            }
            .into());
        }
        if let Some(last_date) = self.last_date() {
            if transaction.date < last_date {
                warn!(
                    "Rejecting out-of-order transaction {} ({} < {})",
                    transaction.id, transaction.date, last_date
                );
                return Err(HistoryError::OutOfOrder {
                    transaction_id: transaction.id.clone(),
                    date: transaction.date,
                    last_date,
                }
                .into());
            }
        }
        if self.index.contains_key(&transaction.id) {
            return Err(HistoryError::DuplicateTransaction(transaction.id.clone()).into());
        }

        let snapshot = Snapshot::capture(transaction, applied, Arc::clone(&self.current));
        self.current = snapshot.shared_values();
        self.index.insert(transaction.id.clone(), self.entries.len());
        self.entries.push(snapshot);
        Ok(())
    }

    pub fn snapshot(&self, transaction_id: &str) -> Option<&Snapshot> {
        self.index
            .get(transaction_id)
            .and_then(|i| self.entries.get(*i))
    }

    pub fn values_for_transaction(&self, transaction_id: &str) -> Option<&Values> {
        self.snapshot(transaction_id).map(|s| s.values())
    }

    pub fn previous_values_for_transaction(&self, transaction_id: &str) -> Option<&Values> {
        self.snapshot(transaction_id).map(|s| s.previous_values())
    }

    pub fn delta_value(&self, transaction_id: &str, attribute: Attribute) -> Option<Decimal> {
        self.snapshot(transaction_id)
            .and_then(|s| s.delta_value(attribute))
    }

    pub fn windowed(&self, window: &Window) -> History {
        match *window {
            Window::Full => self.clone(),
            Window::Until(cutoff) => self.windowed_by_date(cutoff),
            Window::Between { start, end } => self.windowed_by_range(start, end),
        }
    }

    /// Replays entries up to and including `cutoff`, rebased against the
    /// unchanged original base. A cutoff before every entry yields a history
    /// identical to the base.
    pub fn windowed_by_date(&self, cutoff: NaiveDate) -> History {
        let in_window = self.entries.iter().take_while(|e| e.date() <= cutoff);
        Self::replay(&self.base, in_window)
    }

    /// Two-phase reconstruction of the entries dated within `[start, end]`.
    ///
    /// Phase 1 finds the anchor: the last entry dated strictly before `start`,
    /// or the original base. An entry dated exactly on `start` is never the
    /// anchor; it is the first in-window entry, so it is counted exactly once.
    /// Phase 2 replays the in-window entries rebased against the anchor.
    pub fn windowed_by_range(&self, start: NaiveDate, end: NaiveDate) -> History {
        let split = self.entries.partition_point(|e| e.date() < start);
        let anchor: &Values = match split.checked_sub(1) {
            Some(i) => self.entries[i].values(),
            None => &self.base,
        };
        let in_window = self.entries[split..]
            .iter()
            .take_while(|e| e.date() <= end);
        debug!(
            "Windowing history [{}, {}]: {} entries before start",
            start, end, split
        );
        Self::replay(anchor, in_window)
    }

    fn replay<'a>(anchor: &Values, entries: impl Iterator<Item = &'a Snapshot>) -> History {
        let mut base = anchor.full_snapshot();
        base.reset_counters();
        let base = Arc::new(base);

        let mut window = History {
            current: Arc::clone(&base),
            base,
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for entry in entries {
            let rebased = entry.rebase(anchor, Arc::clone(&window.current));
            window.current = rebased.shared_values();
            window
                .index
                .insert(rebased.transaction_id().to_string(), window.entries.len());
            window.entries.push(rebased);
        }
        window
    }
}
