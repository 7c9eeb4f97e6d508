//! Attribution of market-driven movement to income and expense.

use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::buckets::{Bucket, BucketId, BucketKind, BucketList};
use crate::constants::{
    FLUCTUATION_CATEGORY_ID, GROWTH_CATEGORY_ID, MARKET_PAYEE_ID, MARKET_TAX_BASIS_ID,
    REALIZED_GAINS_CATEGORY_ID,
};
use crate::errors::Result;
use crate::values::money::route_signed;
use crate::values::Attribute;

/// Six running totals of one pass. Expenses are positive magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTotals {
    pub market_income: Decimal,
    pub market_expense: Decimal,
    pub growth_income: Decimal,
    pub growth_expense: Decimal,
    pub fluctuation_income: Decimal,
    pub fluctuation_expense: Decimal,
}

impl MarketTotals {
    pub fn net_market(&self) -> Decimal {
        self.market_income - self.market_expense
    }

    pub fn net_growth(&self) -> Decimal {
        self.growth_income - self.growth_expense
    }

    pub fn net_fluctuation(&self) -> Decimal {
        self.fluctuation_income - self.fluctuation_expense
    }

    /// Market movement that is neither growth nor fluctuation.
    pub fn net_realized_gains(&self) -> Decimal {
        self.net_market() - self.net_growth() - self.net_fluctuation()
    }
}

/// How one position's period change splits into causes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAttribution {
    /// Valuation delta net of investments and divestments.
    pub change: Decimal,
    pub realized_gains: Decimal,
    pub growth: Decimal,
    pub fluctuation: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct MarketAnalysis {
    totals: MarketTotals,
}

fn pair(amount: Decimal) -> (Decimal, Decimal) {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    route_signed(amount, &mut income, &mut expense);
    (income, expense)
}

impl MarketAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> MarketTotals {
        self.totals
    }

    fn route_market(&mut self, amount: Decimal) {
        route_signed(
            amount,
            &mut self.totals.market_income,
            &mut self.totals.market_expense,
        );
    }

    /// Routes an account's currency fluctuation, if it carries one.
    pub fn process_account(&mut self, bucket: &Bucket) -> Decimal {
        if !bucket.current().layout().contains(Attribute::Fluctuation) {
            return Decimal::ZERO;
        }
        let fluctuation = bucket.delta(Attribute::Fluctuation).unwrap_or_default();
        route_signed(
            fluctuation,
            &mut self.totals.fluctuation_income,
            &mut self.totals.fluctuation_expense,
        );
        self.route_market(fluctuation);
        fluctuation
    }

    /// Splits a position's period change into realized gains, growth and
    /// currency fluctuation.
    ///
    /// Gains are netted out first, so growth is what remains after both
    /// gains and fluctuation are taken out.
    pub fn process_security(&mut self, bucket: &Bucket) -> SecurityAttribution {
        let delta = |attribute| bucket.delta(attribute).unwrap_or_default();
        let change =
            bucket.valuation_delta() - (delta(Attribute::Invested) - delta(Attribute::Divested));

        let realized_gains = delta(Attribute::RealizedGain);
        self.route_market(realized_gains);

        let remaining = change - realized_gains;
        let fluctuation = delta(Attribute::Fluctuation);
        let growth = remaining - fluctuation;

        route_signed(
            growth,
            &mut self.totals.growth_income,
            &mut self.totals.growth_expense,
        );
        self.route_market(growth);

        route_signed(
            fluctuation,
            &mut self.totals.fluctuation_income,
            &mut self.totals.fluctuation_expense,
        );
        self.route_market(fluctuation);

        SecurityAttribution {
            change,
            realized_gains,
            growth,
            fluctuation,
        }
    }

    /// Posts the totals into the market payee, the growth, fluctuation and
    /// realized-gains categories, and the market tax basis. The synthetic
    /// buckets always exist afterwards; zero pairs are not posted.
    pub fn propagate_totals(
        &self,
        payees: &mut BucketList,
        categories: &mut BucketList,
        tax_bases: &mut BucketList,
        base_currency: &str,
    ) -> Result<()> {
        let totals = self.totals;
        let market = (totals.market_income, totals.market_expense);
        debug!(
            "Propagating market totals: market {}, growth {}, fluctuation {}",
            totals.net_market(),
            totals.net_growth(),
            totals.net_fluctuation()
        );

        let payee = synthetic(
            payees,
            BucketId::Payee(MARKET_PAYEE_ID.to_string()),
            BucketKind::Payee,
            "Market",
            base_currency,
        );
        post_pair(payee, market)?;

        let growth = synthetic(
            categories,
            BucketId::Category(GROWTH_CATEGORY_ID.to_string()),
            BucketKind::Category,
            "Market growth",
            base_currency,
        );
        post_pair(growth, (totals.growth_income, totals.growth_expense))?;

        let fluctuation = synthetic(
            categories,
            BucketId::Category(FLUCTUATION_CATEGORY_ID.to_string()),
            BucketKind::Category,
            "Currency fluctuation",
            base_currency,
        );
        post_pair(
            fluctuation,
            (totals.fluctuation_income, totals.fluctuation_expense),
        )?;

        let realized = synthetic(
            categories,
            BucketId::Category(REALIZED_GAINS_CATEGORY_ID.to_string()),
            BucketKind::Category,
            "Realized gains",
            base_currency,
        );
        post_pair(realized, pair(totals.net_realized_gains()))?;

        let tax_basis = synthetic(
            tax_bases,
            BucketId::TaxBasis(MARKET_TAX_BASIS_ID.to_string()),
            BucketKind::TaxBasis,
            "Market",
            base_currency,
        );
        post_pair(tax_basis, market)?;
        Ok(())
    }
}

fn synthetic<'l>(
    list: &'l mut BucketList,
    id: BucketId,
    kind: BucketKind,
    name: &str,
    base_currency: &str,
) -> &'l mut Bucket {
    let create_id = id.clone();
    list.ensure(&id, || Bucket::new(create_id, kind, name, base_currency))
}

fn post_pair(bucket: &mut Bucket, (income, expense): (Decimal, Decimal)) -> Result<()> {
    if income.is_zero() && expense.is_zero() {
        return Ok(());
    }
    let mut next = bucket.current().full_snapshot();
    next.add_money(Attribute::Income, income)?;
    next.add_money(Attribute::Expense, expense)?;
    next.add_money(Attribute::Profit, income - expense)?;
    bucket.replace_current(next);
    Ok(())
}
