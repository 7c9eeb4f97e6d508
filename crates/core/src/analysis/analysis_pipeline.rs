//! Fixed-order pipeline turning a scanned ledger into an [`Analysis`].
//!
//! Stages: deposits, cash, loans, securities with their portfolio accounts,
//! market propagation, payees, categories, tax bases, tags and sorting, then
//! reconciliation. Later stages read totals produced by earlier ones.

use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::buckets::{Bucket, BucketId, BucketKind, BucketList};
use crate::constants::QUANTITY_THRESHOLD;
use crate::errors::Result;
use crate::ledger::ReferenceData;
use crate::market_data::MarketSeries;
use crate::settings::AnalysisSettings;
use crate::values::Attribute;

use super::analysis_key::AnalysisKey;
use super::analysis_model::Analysis;
use super::ledger_scanner::ScannedLedger;
use super::market_analysis::{MarketAnalysis, SecurityAttribution};
use super::reconciliation::{reconcile, ReconciliationReport};
use super::valuation::{HoldingsValuation, ValuationContext};

const KIND_TOTALS: [BucketKind; 9] = [
    BucketKind::Deposit,
    BucketKind::Cash,
    BucketKind::Loan,
    BucketKind::Portfolio,
    BucketKind::Security,
    BucketKind::Payee,
    BucketKind::Category,
    BucketKind::TaxBasis,
    BucketKind::Tag,
];

pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// Shared inputs of every analysis built from one scan.
pub struct PipelineContext<'a> {
    pub reference: &'a ReferenceData,
    pub market: &'a MarketSeries,
    pub settings: &'a AnalysisSettings,
    pub base_scale: u32,
}

/// Running state of one pipeline pass.
struct Pass<'a> {
    context: &'a PipelineContext<'a>,
    valuation: ValuationContext<'a>,
    market: MarketAnalysis,
    accounts: BucketList,
    account_groups: BucketList,
    positions: BucketList,
    kind_totals: BucketList,
    holdings: HashMap<String, HoldingsValuation>,
    attributions: Vec<(BucketId, SecurityAttribution)>,
    has_active_positions: bool,
}

impl<'a> Pass<'a> {
    fn roll_up(kind_totals: &mut BucketList, kind: BucketKind, bucket: &Bucket) {
        if let Some(total) = kind_totals.get_mut(&BucketId::KindTotal(kind)) {
            total.merge(bucket);
        }
    }

    fn account_stage(&mut self, kind: BucketKind) -> Result<()> {
        let mut processed = 0usize;
        for bucket in self.accounts.iter_mut().filter(|b| b.kind() == kind) {
            let BucketId::Account(account_id) = bucket.id().clone() else {
                continue;
            };
            let holdings = match kind {
                BucketKind::Portfolio => {
                    Some(self.holdings.get(&account_id).copied().unwrap_or_default())
                }
                _ => None,
            };
            self.valuation.finalize_account(bucket, holdings)?;
            self.market.process_account(bucket);

            if let Some(account) = self.context.reference.account(&account_id) {
                let group_id = BucketId::AccountGroup(account.group_id.clone());
                if let Some(group) = self.account_groups.get_mut(&group_id) {
                    group.merge(bucket);
                }
            }
            Self::roll_up(&mut self.kind_totals, kind, bucket);
            processed += 1;
        }
        debug!("{} stage: {} accounts", kind, processed);
        Ok(())
    }

    fn security_stage(&mut self) -> Result<()> {
        for bucket in self.positions.iter_mut() {
            self.valuation.finalize_position(bucket)?;
            let attribution = self.market.process_security(bucket);

            let mut current = bucket.current().full_snapshot();
            let base_growth = bucket.base().money_or_zero(Attribute::Growth)?;
            current.set_money(Attribute::Growth, base_growth + attribution.growth)?;
            bucket.replace_current(current);

            if let BucketId::Position { account_id, .. } = bucket.id() {
                let entry = self.holdings.entry(account_id.clone()).or_default();
                entry.open += bucket.base().money_or_zero(Attribute::Valuation)?;
                entry.close += bucket.current().money_or_zero(Attribute::Valuation)?;
            }
            let units = bucket.current().units(Attribute::Units)?.unwrap_or_default();
            self.has_active_positions |= is_quantity_significant(&units);

            self.attributions.push((bucket.id().clone(), attribution));
            Self::roll_up(&mut self.kind_totals, BucketKind::Security, bucket);
        }
        debug!("SECURITY stage: {} positions", self.positions.len());
        Ok(())
    }
}

fn roll_up_list(kind_totals: &mut BucketList, kind: BucketKind, list: &BucketList) {
    for bucket in list {
        Pass::roll_up(kind_totals, kind, bucket);
    }
    debug!("{} stage: {} buckets", kind, list.len());
}

/// Runs every stage for `key` over fresh windowed copies of the scanned
/// buckets. The scanned ledger itself is never modified.
pub fn build_analysis(
    context: &PipelineContext<'_>,
    scanned: &ScannedLedger,
    key: AnalysisKey,
) -> Result<Analysis> {
    key.validate()?;
    let window = key.window();
    let open_date = key.open_date();
    let close_date = key.close_date(scanned.last_date);
    let base = context.settings.base_currency.as_str();
    debug!(
        "Building analysis {} (open {:?}, close {:?})",
        key, open_date, close_date
    );

    let mut account_groups = BucketList::new();
    for group in context.reference.account_groups() {
        account_groups.insert(
            Bucket::aggregate(
                BucketId::AccountGroup(group.id.clone()),
                group.kind.into(),
                &group.name,
                base,
            )
            .with_sort_tag(group.sort_tag.clone()),
        );
    }
    let kind_totals: BucketList = KIND_TOTALS
        .iter()
        .map(|kind| Bucket::aggregate(BucketId::KindTotal(*kind), *kind, kind.as_str(), base))
        .collect();

    let mut pass = Pass {
        context,
        valuation: ValuationContext::new(
            context.reference,
            context.market,
            context.base_scale,
            open_date,
            close_date,
        ),
        market: MarketAnalysis::new(),
        accounts: scanned.accounts.windowed(&window),
        account_groups,
        positions: scanned.positions.windowed(&window),
        kind_totals,
        holdings: HashMap::new(),
        attributions: Vec::new(),
        has_active_positions: false,
    };

    pass.account_stage(BucketKind::Deposit)?;
    pass.account_stage(BucketKind::Cash)?;
    pass.account_stage(BucketKind::Loan)?;
    pass.security_stage()?;
    pass.account_stage(BucketKind::Portfolio)?;

    let mut payees = scanned.payees.windowed(&window);
    let mut categories = scanned.categories.windowed(&window);
    let mut tax_bases = scanned.tax_bases.windowed(&window);
    let mut tags = scanned.tags.windowed(&window);
    pass.market
        .propagate_totals(&mut payees, &mut categories, &mut tax_bases, base)?;

    roll_up_list(&mut pass.kind_totals, BucketKind::Payee, &payees);
    roll_up_list(&mut pass.kind_totals, BucketKind::Category, &categories);
    roll_up_list(&mut pass.kind_totals, BucketKind::TaxBasis, &tax_bases);
    roll_up_list(&mut pass.kind_totals, BucketKind::Tag, &tags);

    for list in [
        &mut pass.accounts,
        &mut pass.account_groups,
        &mut pass.positions,
        &mut payees,
        &mut categories,
        &mut tax_bases,
        &mut tags,
    ] {
        list.sort_by_tag();
    }

    let has_foreign_currency = pass
        .accounts
        .iter()
        .chain(pass.positions.iter())
        .any(Bucket::has_foreign_currency);

    let mut analysis = Analysis {
        key,
        base_currency: base.to_string(),
        open_date,
        close_date,
        accounts: pass.accounts,
        account_groups: pass.account_groups,
        positions: pass.positions,
        payees,
        categories,
        tax_bases,
        tags,
        kind_totals: pass.kind_totals,
        attributions: pass.attributions,
        market: pass.market.totals(),
        warnings: scanned.warnings.clone(),
        reconciliation: ReconciliationReport::default(),
        has_foreign_currency,
        has_active_positions: pass.has_active_positions,
    };
    analysis.reconciliation = reconcile(&analysis, context.settings.reconciliation_tolerance);
    Ok(analysis)
}
