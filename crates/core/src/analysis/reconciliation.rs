//! Cross-check of independently computed profit totals.
//!
//! Account-side profit, payee profit, category profit and tax-basis gross
//! are built from different buckets and must agree. A disagreement is a
//! diagnostic carried by the analysis and logged, never an error.

use log::error;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// The four independently computed totals.
pub trait ProfitTotals {
    /// Deposit, cash, loan and portfolio kinds combined.
    fn account_profit(&self) -> Decimal;
    fn payee_profit(&self) -> Decimal;
    fn category_profit(&self) -> Decimal;
    fn tax_basis_gross(&self) -> Decimal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationAxis {
    Accounts,
    Payees,
    Categories,
    TaxBases,
}

impl ReconciliationAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationAxis::Accounts => "ACCOUNTS",
            ReconciliationAxis::Payees => "PAYEES",
            ReconciliationAxis::Categories => "CATEGORIES",
            ReconciliationAxis::TaxBases => "TAX_BASES",
        }
    }
}

impl fmt::Display for ReconciliationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityMismatch {
    pub left: ReconciliationAxis,
    pub right: ReconciliationAxis,
    pub left_total: Decimal,
    pub right_total: Decimal,
    pub difference: Decimal,
}

impl fmt::Display for IntegrityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total {} differs from {} total {} by {}",
            self.left, self.left_total, self.right, self.right_total, self.difference
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub account_profit: Decimal,
    pub payee_profit: Decimal,
    pub category_profit: Decimal,
    pub tax_basis_gross: Decimal,
    pub mismatches: Vec<IntegrityMismatch>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compares every total against account-side profit.
pub fn reconcile(totals: &dyn ProfitTotals, tolerance: Decimal) -> ReconciliationReport {
    let account_profit = totals.account_profit();
    let mut report = ReconciliationReport {
        account_profit,
        payee_profit: totals.payee_profit(),
        category_profit: totals.category_profit(),
        tax_basis_gross: totals.tax_basis_gross(),
        mismatches: Vec::new(),
    };

    let others = [
        (ReconciliationAxis::Payees, report.payee_profit),
        (ReconciliationAxis::Categories, report.category_profit),
        (ReconciliationAxis::TaxBases, report.tax_basis_gross),
    ];
    for (axis, total) in others {
        let difference = account_profit - total;
        if difference.abs() > tolerance {
            let mismatch = IntegrityMismatch {
                left: ReconciliationAxis::Accounts,
                right: axis,
                left_total: account_profit,
                right_total: total,
                difference,
            };
            error!("Reconciliation mismatch: {}", mismatch);
            report.mismatches.push(mismatch);
        }
    }
    report
}
