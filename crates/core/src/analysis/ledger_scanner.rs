//! Canonical forward pass over the transaction feed.
//!
//! Builds one tracked bucket per account, position, payee, category, tax
//! basis and tag, and registers one snapshot per touched bucket for every
//! transaction, in feed order.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::buckets::{Bucket, BucketExtension, BucketId, BucketKind, BucketList};
use crate::constants::{UNASSIGNED_PAYEE_ID, UNASSIGNED_TAX_BASIS_ID, UNCATEGORIZED_ID};
use crate::errors::{Result, ValidationError};
use crate::ledger::{AccountKind, ReferenceData, Transaction, TransactionKind};
use crate::market_data::{CursorSet, MarketSeries};
use crate::settings::AnalysisSettings;
use crate::values::money::{convert_to_base, round_to_scale, route_signed};
use crate::values::{Attribute, Values};

use super::valuation::gain_ratio;

/// A transaction the scanner could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanWarning {
    pub transaction_id: String,
    pub account_id: String,
    pub date: NaiveDate,
    pub message: String,
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transaction {} (account: {}, date: {}): {}",
            self.transaction_id, self.account_id, self.date, self.message
        )
    }
}

/// Result of the forward pass: every bucket with its full history.
#[derive(Debug, Clone, Default)]
pub struct ScannedLedger {
    pub accounts: BucketList,
    pub positions: BucketList,
    pub payees: BucketList,
    pub categories: BucketList,
    pub tax_bases: BucketList,
    pub tags: BucketList,
    pub warnings: Vec<ScanWarning>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub applied_count: usize,
}

/// Flow bucket targets of a standard transaction.
struct FlowTargets {
    payee: BucketId,
    category: BucketId,
    tax_basis: BucketId,
}

pub struct LedgerScanner<'a> {
    reference: &'a ReferenceData,
    market: &'a MarketSeries,
    settings: &'a AnalysisSettings,
    base_scale: u32,
}

/// Fails when the feed is not in ascending date order.
pub fn ensure_sorted(transactions: &[Transaction]) -> Result<()> {
    for pair in transactions.windows(2) {
        if pair[1].date < pair[0].date {
            return Err(ValidationError::UnsortedFeed {
                transaction_id: pair[1].id.clone(),
                date: pair[1].date,
                previous: pair[0].date,
            }
            .into());
        }
    }
    Ok(())
}

fn flow_bucket(id: BucketId, kind: BucketKind, name: &str, base_currency: &str) -> Bucket {
    Bucket::tracked(id, kind, name, base_currency)
}

impl<'a> LedgerScanner<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        market: &'a MarketSeries,
        settings: &'a AnalysisSettings,
        base_scale: u32,
    ) -> Self {
        LedgerScanner {
            reference,
            market,
            settings,
            base_scale,
        }
    }

    fn base_currency(&self) -> &str {
        &self.settings.base_currency
    }

    /// Creates a bucket for every known record, so idle ones are listed too.
    fn seed(&self) -> ScannedLedger {
        let base = self.base_currency();
        let mut ledger = ScannedLedger::default();

        for account in self.reference.accounts() {
            let Some(kind) = self.reference.account_kind(&account.id) else {
                continue;
            };
            let mut bucket = Bucket::tracked(
                BucketId::Account(account.id.clone()),
                kind.into(),
                &account.name,
                &account.currency,
            );
            if self.reference.is_credit_card(&account.id) {
                bucket = bucket.with_extension(BucketExtension::CreditCard);
            }
            let mut bucket = bucket.with_sort_tag(account.sort_tag.clone());
            bucket.set_has_foreign_currency(account.currency != base);
            ledger.accounts.insert(bucket);
        }
        for payee in self.reference.payees() {
            ledger.payees.insert(
                flow_bucket(
                    BucketId::Payee(payee.id.clone()),
                    BucketKind::Payee,
                    &payee.name,
                    base,
                )
                .with_sort_tag(payee.sort_tag.clone()),
            );
        }
        for category in self.reference.categories() {
            ledger.categories.insert(
                flow_bucket(
                    BucketId::Category(category.id.clone()),
                    BucketKind::Category,
                    &category.name,
                    base,
                )
                .with_sort_tag(category.sort_tag.clone()),
            );
        }
        for tax_basis in self.reference.tax_bases() {
            ledger.tax_bases.insert(
                flow_bucket(
                    BucketId::TaxBasis(tax_basis.id.clone()),
                    BucketKind::TaxBasis,
                    &tax_basis.name,
                    base,
                )
                .with_sort_tag(tax_basis.sort_tag.clone()),
            );
        }
        ledger
    }

    /// Runs the pass. Unknown references skip the transaction with a warning;
    /// an unsorted feed fails the whole pass.
    pub fn scan(&self, transactions: &[Transaction]) -> Result<ScannedLedger> {
        ensure_sorted(transactions)?;
        debug!(
            "Scanning {} transactions in {}",
            transactions.len(),
            self.base_currency()
        );

        let mut ledger = self.seed();
        let mut rates = CursorSet::rates(self.market);
        let mut prices = CursorSet::prices(self.market);
        let mut seen: HashSet<&str> = HashSet::new();

        for tx in transactions {
            if !seen.insert(tx.id.as_str()) {
                self.skip(&mut ledger, tx, "Duplicate transaction id. Skipped.".to_string());
                continue;
            }
            if let Err(message) = self.check_references(&ledger, tx) {
                self.skip(&mut ledger, tx, message);
                continue;
            }
            self.apply(&mut ledger, tx, &mut rates, &mut prices)?;
            ledger.first_date.get_or_insert(tx.date);
            ledger.last_date = Some(tx.date);
            ledger.applied_count += 1;
        }

        debug!(
            "Scan complete: {} applied, {} skipped",
            ledger.applied_count,
            ledger.warnings.len()
        );
        Ok(ledger)
    }

    fn skip(&self, ledger: &mut ScannedLedger, tx: &Transaction, message: String) {
        let warning = ScanWarning {
            transaction_id: tx.id.clone(),
            account_id: tx.account_id.clone(),
            date: tx.date,
            message,
        };
        warn!("{}", warning);
        ledger.warnings.push(warning);
    }

    /// Validates every reference before anything is applied.
    fn check_references(
        &self,
        ledger: &ScannedLedger,
        tx: &Transaction,
    ) -> std::result::Result<(), String> {
        let Some(kind) = self.reference.account_kind(&tx.account_id) else {
            return Err(format!("Unknown account {}. Skipped.", tx.account_id));
        };
        match tx.kind {
            TransactionKind::Standard => {
                if let Some(payee_id) = tx.payee_id.as_deref() {
                    if self.reference.payee(payee_id).is_none() {
                        return Err(format!("Unknown payee {}. Skipped.", payee_id));
                    }
                }
                if let Some(category_id) = tx.category_id.as_deref() {
                    let Some(category) = self.reference.category(category_id) else {
                        return Err(format!("Unknown category {}. Skipped.", category_id));
                    };
                    if let Some(tax_basis_id) = category.tax_basis_id.as_deref() {
                        if self.reference.tax_basis(tax_basis_id).is_none() {
                            return Err(format!(
                                "Category {} references unknown tax basis {}. Skipped.",
                                category_id, tax_basis_id
                            ));
                        }
                    }
                }
            }
            TransactionKind::Transfer => {
                if let Some(counter) = tx.transfer_account_id.as_deref() {
                    if self.reference.account(counter).is_none() {
                        return Err(format!("Unknown transfer account {}. Skipped.", counter));
                    }
                }
            }
            TransactionKind::Buy | TransactionKind::Sell => {
                if kind != AccountKind::Portfolio {
                    return Err(format!(
                        "{} on non-portfolio account. Skipped.",
                        tx.kind.as_str()
                    ));
                }
                let Some(security_id) = tx.security_id.as_deref() else {
                    return Err("Trade without security. Skipped.".to_string());
                };
                if self.reference.security(security_id).is_none() {
                    return Err(format!("Unknown security {}. Skipped.", security_id));
                }
                let units = tx.units.unwrap_or_default();
                if units <= Decimal::ZERO {
                    return Err(format!(
                        "Trade units must be positive, got {}. Skipped.",
                        units
                    ));
                }
                let expected_sign_ok = match tx.kind {
                    TransactionKind::Buy => tx.amount <= Decimal::ZERO,
                    _ => tx.amount >= Decimal::ZERO,
                };
                if !expected_sign_ok {
                    return Err(format!(
                        "{} amount has the wrong sign ({}). Skipped.",
                        tx.kind.as_str(),
                        tx.amount
                    ));
                }
                if tx.kind == TransactionKind::Sell {
                    let held = ledger
                        .positions
                        .get(&BucketId::position(&tx.account_id, security_id))
                        .and_then(|p| p.current().units(Attribute::Units).ok().flatten())
                        .unwrap_or_default();
                    if units > held {
                        return Err(format!(
                            "Selling {} units of {} while holding {}. Skipped.",
                            units, security_id, held
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn flow_targets(&self, tx: &Transaction) -> FlowTargets {
        let payee = tx.payee_id.as_deref().unwrap_or(UNASSIGNED_PAYEE_ID);
        let category = tx.category_id.as_deref().unwrap_or(UNCATEGORIZED_ID);
        let tax_basis = tx
            .category_id
            .as_deref()
            .and_then(|id| self.reference.category(id))
            .and_then(|c| c.tax_basis_id.as_deref())
            .unwrap_or(UNASSIGNED_TAX_BASIS_ID);
        FlowTargets {
            payee: BucketId::Payee(payee.to_string()),
            category: BucketId::Category(category.to_string()),
            tax_basis: BucketId::TaxBasis(tax_basis.to_string()),
        }
    }

    fn apply(
        &self,
        ledger: &mut ScannedLedger,
        tx: &Transaction,
        rates: &mut CursorSet<'_>,
        prices: &mut CursorSet<'_>,
    ) -> Result<()> {
        let account_id = BucketId::Account(tx.account_id.clone());
        let Some(account) = ledger.accounts.get_mut(&account_id) else {
            return Ok(());
        };
        let rate = rates.value_at(account.currency(), tx.date);
        let base_amount = convert_to_base(tx.amount, rate, self.base_scale);

        let mut next = account.current().full_snapshot();
        post_to_account(&mut next, tx, rate, base_amount, self.base_scale)?;
        if let Some(extension) = account.extension() {
            extension.on_posting(&mut next, tx.amount)?;
        }
        let account_currency = account.currency().to_string();
        let account_foreign = account.has_foreign_currency();
        account.register_transaction(tx, next)?;

        match tx.kind {
            TransactionKind::Standard => self.apply_flows(ledger, tx, base_amount)?,
            TransactionKind::Transfer => {}
            TransactionKind::Buy | TransactionKind::Sell => self.apply_trade(
                ledger,
                tx,
                &account_currency,
                account_foreign,
                rate,
                base_amount,
                prices,
            )?,
        }
        Ok(())
    }

    fn apply_flows(
        &self,
        ledger: &mut ScannedLedger,
        tx: &Transaction,
        base_amount: Decimal,
    ) -> Result<()> {
        let base = self.settings.base_currency.clone();
        let targets = self.flow_targets(tx);

        let payee = ledger.payees.ensure(&targets.payee, || {
            flow_bucket(targets.payee.clone(), BucketKind::Payee, "Unassigned", &base)
        });
        post_flow(payee, tx, base_amount)?;

        let category = ledger.categories.ensure(&targets.category, || {
            flow_bucket(targets.category.clone(), BucketKind::Category, "Uncategorized", &base)
        });
        post_flow(category, tx, base_amount)?;

        let tax_basis = ledger.tax_bases.ensure(&targets.tax_basis, || {
            flow_bucket(targets.tax_basis.clone(), BucketKind::TaxBasis, "Unassigned", &base)
        });
        post_flow(tax_basis, tx, base_amount)?;

        if self.settings.include_tags {
            let mut posted: HashSet<&str> = HashSet::new();
            for tag in &tx.tags {
                if !posted.insert(tag.as_str()) {
                    continue;
                }
                let id = BucketId::Tag(tag.clone());
                let bucket = ledger
                    .tags
                    .ensure(&id, || flow_bucket(id.clone(), BucketKind::Tag, tag, &base));
                post_flow(bucket, tx, base_amount)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_trade(
        &self,
        ledger: &mut ScannedLedger,
        tx: &Transaction,
        account_currency: &str,
        account_foreign: bool,
        rate: Decimal,
        base_amount: Decimal,
        prices: &mut CursorSet<'_>,
    ) -> Result<()> {
        let (Some(security_id), Some(units)) = (tx.security_id.as_deref(), tx.units) else {
            return Ok(());
        };
        let Some(security) = self.reference.security(security_id) else {
            return Ok(());
        };
        let local_scale = self.reference.currency_scale(account_currency);
        let id = BucketId::position(&tx.account_id, security_id);
        let position = ledger.positions.ensure(&id, || {
            if security.currency != account_currency {
                warn!(
                    "Security {} is quoted in {} but held in a {} account. Prices are taken as {}.",
                    security.id, security.currency, account_currency, account_currency
                );
            }
            let mut bucket = Bucket::tracked(
                id.clone(),
                BucketKind::Security,
                &security.name,
                account_currency,
            )
            .with_sort_tag(security.sort_tag.clone());
            bucket.set_has_foreign_currency(account_foreign);
            bucket
        });

        let mut next = position.current().full_snapshot();
        let held = next.units(Attribute::Units)?.unwrap_or_default();
        let cost_basis = next.money_or_zero(Attribute::CostBasis)?;
        let cash = tx.amount.abs();

        match tx.kind {
            TransactionKind::Buy => {
                next.set_units(Attribute::Units, held + units)?;
                next.add_units(Attribute::UnitsIn, units)?;
                next.set_money(Attribute::CostBasis, cost_basis + cash)?;
                next.add_money(Attribute::NetInvestedLocal, cash)?;
                next.add_money(Attribute::Invested, -base_amount)?;
            }
            TransactionKind::Sell => {
                let cost_sold = if held.is_zero() {
                    Decimal::ZERO
                } else {
                    round_to_scale(cost_basis / held * units, local_scale)
                };
                let remaining = held - units;
                let remaining_cost = if remaining.is_zero() {
                    Decimal::ZERO
                } else {
                    cost_basis - cost_sold
                };
                let gain_local = cash - cost_sold;
                next.set_units(Attribute::Units, remaining)?;
                next.add_units(Attribute::UnitsOut, units)?;
                next.set_money(Attribute::CostBasis, remaining_cost)?;
                next.add_money(Attribute::NetInvestedLocal, -cash)?;
                next.add_money(Attribute::Divested, base_amount)?;
                next.add_money(
                    Attribute::RealizedGain,
                    convert_to_base(gain_local, rate, self.base_scale),
                )?;
                next.add_money(Attribute::RealizedGainLocal, gain_local)?;
            }
            _ => return Ok(()),
        }

        let trade_price = cash / units;
        let price = prices.known_at(security_id, tx.date).unwrap_or(trade_price);
        revalue_position(&mut next, price, rate, local_scale, self.base_scale)?;
        next.set_date(Attribute::LastActivity, tx.date)?;
        position.register_transaction(tx, next)
    }
}

/// Account-side effect of a transaction on its own account.
fn post_to_account(
    next: &mut Values,
    tx: &Transaction,
    rate: Decimal,
    base_amount: Decimal,
    base_scale: u32,
) -> Result<()> {
    next.add_money(Attribute::Balance, tx.amount)?;
    let balance = next.money_or_zero(Attribute::Balance)?;
    next.set_money(Attribute::Valuation, convert_to_base(balance, rate, base_scale))?;
    next.set_rate(Attribute::ExchangeRate, rate)?;
    next.set_date(Attribute::LastActivity, tx.date)?;

    let magnitude = base_amount.abs();
    match tx.kind {
        TransactionKind::Standard => {
            let mut income = next.money_or_zero(Attribute::Income)?;
            let mut expense = next.money_or_zero(Attribute::Expense)?;
            route_signed(base_amount, &mut income, &mut expense);
            next.set_money(Attribute::Income, income)?;
            next.set_money(Attribute::Expense, expense)?;
            next.add_money(Attribute::Profit, base_amount)?;
        }
        TransactionKind::Transfer => {
            if base_amount > Decimal::ZERO {
                next.add_money(Attribute::TransfersIn, magnitude)?;
            } else if base_amount < Decimal::ZERO {
                next.add_money(Attribute::TransfersOut, magnitude)?;
            }
        }
        TransactionKind::Buy | TransactionKind::Sell => {
            if base_amount > Decimal::ZERO {
                next.add_money(Attribute::TradesIn, magnitude)?;
            } else if base_amount < Decimal::ZERO {
                next.add_money(Attribute::TradesOut, magnitude)?;
            }
        }
    }
    Ok(())
}

fn post_flow(bucket: &mut Bucket, tx: &Transaction, base_amount: Decimal) -> Result<()> {
    let mut next = bucket.current().full_snapshot();
    let mut income = next.money_or_zero(Attribute::Income)?;
    let mut expense = next.money_or_zero(Attribute::Expense)?;
    route_signed(base_amount, &mut income, &mut expense);
    next.set_money(Attribute::Income, income)?;
    next.set_money(Attribute::Expense, expense)?;
    next.add_money(Attribute::Profit, base_amount)?;
    next.set_date(Attribute::LastActivity, tx.date)?;
    bucket.register_transaction(tx, next)
}

/// Recomputes the instantaneous valuation fields of a position.
pub(crate) fn revalue_position(
    values: &mut Values,
    price: Decimal,
    rate: Decimal,
    local_scale: u32,
    base_scale: u32,
) -> Result<()> {
    let units = values.units(Attribute::Units)?.unwrap_or_default();
    let local_valuation = round_to_scale(units * price, local_scale);
    let cost_basis = values.money_or_zero(Attribute::CostBasis)?;
    values.set_rate(Attribute::Price, price)?;
    values.set_rate(Attribute::ExchangeRate, rate)?;
    values.set_money(Attribute::LocalValuation, local_valuation)?;
    values.set_money(
        Attribute::Valuation,
        convert_to_base(local_valuation, rate, base_scale),
    )?;
    values.set_ratio(Attribute::GainRatio, gain_ratio(local_valuation, cost_basis))?;
    Ok(())
}
