//! Read-only result of one analysis pass.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::buckets::{Bucket, BucketId, BucketKind, BucketList};
use crate::values::{Attribute, Value, Values};

use super::analysis_key::AnalysisKey;
use super::ledger_scanner::ScanWarning;
use super::market_analysis::{MarketTotals, SecurityAttribution};
use super::reconciliation::{ProfitTotals, ReconciliationReport};

/// Aggregated state for one key. Immutable once built, shared through `Arc`;
/// every query hands out copies.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub(crate) key: AnalysisKey,
    pub(crate) base_currency: String,
    pub(crate) open_date: Option<NaiveDate>,
    pub(crate) close_date: Option<NaiveDate>,
    pub(crate) accounts: BucketList,
    pub(crate) account_groups: BucketList,
    pub(crate) positions: BucketList,
    pub(crate) payees: BucketList,
    pub(crate) categories: BucketList,
    pub(crate) tax_bases: BucketList,
    pub(crate) tags: BucketList,
    pub(crate) kind_totals: BucketList,
    pub(crate) attributions: Vec<(BucketId, SecurityAttribution)>,
    pub(crate) market: MarketTotals,
    pub(crate) warnings: Vec<ScanWarning>,
    pub(crate) reconciliation: ReconciliationReport,
    pub(crate) has_foreign_currency: bool,
    pub(crate) has_active_positions: bool,
}

impl Analysis {
    pub fn key(&self) -> AnalysisKey {
        self.key
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn open_date(&self) -> Option<NaiveDate> {
        self.open_date
    }

    pub fn close_date(&self) -> Option<NaiveDate> {
        self.close_date
    }

    pub fn accounts(&self) -> &BucketList {
        &self.accounts
    }

    pub fn account_groups(&self) -> &BucketList {
        &self.account_groups
    }

    pub fn positions(&self) -> &BucketList {
        &self.positions
    }

    pub fn payees(&self) -> &BucketList {
        &self.payees
    }

    pub fn categories(&self) -> &BucketList {
        &self.categories
    }

    pub fn tax_bases(&self) -> &BucketList {
        &self.tax_bases
    }

    pub fn tags(&self) -> &BucketList {
        &self.tags
    }

    pub fn kind_totals(&self) -> &BucketList {
        &self.kind_totals
    }

    fn list_for(&self, id: &BucketId) -> &BucketList {
        match id {
            BucketId::Account(_) => &self.accounts,
            BucketId::AccountGroup(_) => &self.account_groups,
            BucketId::KindTotal(_) => &self.kind_totals,
            BucketId::Position { .. } => &self.positions,
            BucketId::Payee(_) => &self.payees,
            BucketId::Category(_) => &self.categories,
            BucketId::TaxBasis(_) => &self.tax_bases,
            BucketId::Tag(_) => &self.tags,
        }
    }

    /// Copy of a bucket, `None` when it does not exist in this analysis.
    pub fn bucket(&self, id: &BucketId) -> Option<Bucket> {
        self.list_for(id).get(id).cloned()
    }

    pub fn kind_total(&self, kind: BucketKind) -> Option<Bucket> {
        self.bucket(&BucketId::KindTotal(kind))
    }

    pub fn current_values(&self, id: &BucketId) -> Option<Values> {
        self.list_for(id).get(id).map(|b| b.current().full_snapshot())
    }

    pub fn base_values(&self, id: &BucketId) -> Option<Values> {
        self.list_for(id).get(id).map(|b| b.base().full_snapshot())
    }

    pub fn value(&self, id: &BucketId, attribute: Attribute) -> Option<Value> {
        self.list_for(id).get(id).and_then(|b| b.current().get(attribute))
    }

    pub fn delta(&self, id: &BucketId, attribute: Attribute) -> Option<Decimal> {
        self.list_for(id).get(id).and_then(|b| b.delta(attribute))
    }

    pub fn values_for_transaction(&self, id: &BucketId, transaction_id: &str) -> Option<Values> {
        self.list_for(id)
            .get(id)
            .and_then(|b| b.values_for_transaction(transaction_id))
    }

    pub fn previous_values_for_transaction(
        &self,
        id: &BucketId,
        transaction_id: &str,
    ) -> Option<Values> {
        self.list_for(id)
            .get(id)
            .and_then(|b| b.previous_values_for_transaction(transaction_id))
    }

    pub fn delta_value(
        &self,
        id: &BucketId,
        transaction_id: &str,
        attribute: Attribute,
    ) -> Option<Decimal> {
        self.list_for(id)
            .get(id)
            .and_then(|b| b.delta_value(transaction_id, attribute))
    }

    pub fn attribution(&self, id: &BucketId) -> Option<SecurityAttribution> {
        self.attributions
            .iter()
            .find(|(position, _)| position == id)
            .map(|(_, attribution)| *attribution)
    }

    pub fn market_totals(&self) -> MarketTotals {
        self.market
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn reconciliation(&self) -> &ReconciliationReport {
        &self.reconciliation
    }

    pub fn is_consistent(&self) -> bool {
        self.reconciliation.is_consistent()
    }

    /// Any account or position holds a non-base currency.
    pub fn has_foreign_currency(&self) -> bool {
        self.has_foreign_currency
    }

    /// Any position still holds units at the close date.
    pub fn has_active_positions(&self) -> bool {
        self.has_active_positions
    }

    fn kind_profit(&self, kind: BucketKind) -> Decimal {
        self.kind_totals
            .get(&BucketId::KindTotal(kind))
            .map(Bucket::profit)
            .unwrap_or_default()
    }
}

impl ProfitTotals for Analysis {
    fn account_profit(&self) -> Decimal {
        [
            BucketKind::Deposit,
            BucketKind::Cash,
            BucketKind::Loan,
            BucketKind::Portfolio,
        ]
        .into_iter()
        .map(|kind| self.kind_profit(kind))
        .sum()
    }

    fn payee_profit(&self) -> Decimal {
        self.kind_profit(BucketKind::Payee)
    }

    fn category_profit(&self) -> Decimal {
        self.kind_profit(BucketKind::Category)
    }

    fn tax_basis_gross(&self) -> Decimal {
        self.kind_profit(BucketKind::TaxBasis)
    }
}
