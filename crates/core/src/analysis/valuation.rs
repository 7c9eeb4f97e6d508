//! Values accounts and positions at the open and close dates of an analysis.
//!
//! The scanner values every snapshot at its own transaction date. The
//! finalisers re-value the base at the open date and current at the close
//! date, then derive the period's fluctuation and profit from the two.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::buckets::{Bucket, BucketId};
use crate::constants::RATIO_PRECISION;
use crate::errors::Result;
use crate::ledger::ReferenceData;
use crate::market_data::{CursorSet, MarketSeries};
use crate::values::money::{convert_to_base, round_to_scale};
use crate::values::{Attribute, Values};

use super::ledger_scanner::revalue_position;

/// `(local_valuation - cost_basis) / cost_basis`, zero without a cost basis.
pub fn gain_ratio(local_valuation: Decimal, cost_basis: Decimal) -> Decimal {
    if cost_basis.is_zero() {
        return Decimal::ZERO;
    }
    ((local_valuation - cost_basis) / cost_basis).round_dp(RATIO_PRECISION)
}

/// Open and close valuations of the positions held in one portfolio account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldingsValuation {
    pub open: Decimal,
    pub close: Decimal,
}

/// Price and rate lookups at the two valuation dates of one analysis.
///
/// Each date has its own cursor sets, so every set only ever sees one query
/// date and the ascending-query contract holds trivially.
pub struct ValuationContext<'a> {
    reference: &'a ReferenceData,
    base_scale: u32,
    open: Option<NaiveDate>,
    close: Option<NaiveDate>,
    open_rates: CursorSet<'a>,
    open_prices: CursorSet<'a>,
    close_rates: CursorSet<'a>,
    close_prices: CursorSet<'a>,
}

fn counter_delta(values: &Values, base: &Values, attribute: Attribute) -> Decimal {
    values.delta(attribute, base).unwrap_or_default()
}

impl<'a> ValuationContext<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        market: &'a MarketSeries,
        base_scale: u32,
        open: Option<NaiveDate>,
        close: Option<NaiveDate>,
    ) -> Self {
        ValuationContext {
            reference,
            base_scale,
            open,
            close,
            open_rates: CursorSet::rates(market),
            open_prices: CursorSet::prices(market),
            close_rates: CursorSet::rates(market),
            close_prices: CursorSet::prices(market),
        }
    }

    pub fn open_date(&self) -> Option<NaiveDate> {
        self.open
    }

    pub fn close_date(&self) -> Option<NaiveDate> {
        self.close
    }

    /// Re-values a position and sets its period fluctuation and profit.
    ///
    /// Fluctuation is the currency effect: the open position re-valued at
    /// the close rate, plus net local investments and local realized gains
    /// valued at the close rate, minus their booked base amounts. Realized
    /// gains stay at the sale rate, so a closed position shows no growth.
    pub fn finalize_position(&mut self, bucket: &mut Bucket) -> Result<()> {
        let Some(close) = self.close else {
            return Ok(());
        };
        let Some(security_id) = position_security(bucket) else {
            return Ok(());
        };
        let currency = bucket.currency().to_string();
        let local_scale = self.reference.currency_scale(&currency);

        let mut base = bucket.base().full_snapshot();
        let fx_open = match self.open {
            Some(open) => {
                let fallback = base.rate(Attribute::Price)?.unwrap_or_default();
                let price = self.open_prices.known_at(&security_id, open).unwrap_or(fallback);
                let rate = self.open_rates.value_at(&currency, open);
                revalue_position(&mut base, price, rate, local_scale, self.base_scale)?;
                rate
            }
            None => base.rate(Attribute::ExchangeRate)?.unwrap_or_default(),
        };

        let mut current = bucket.current().full_snapshot();
        let fallback = current.rate(Attribute::Price)?.unwrap_or_default();
        let price = self.close_prices.known_at(&security_id, close).unwrap_or(fallback);
        let fx_close = self.close_rates.value_at(&currency, close);
        revalue_position(&mut current, price, fx_close, local_scale, self.base_scale)?;

        let open_local = base.money_or_zero(Attribute::LocalValuation)?;
        let valuation_change = current.money_or_zero(Attribute::Valuation)?
            - base.money_or_zero(Attribute::Valuation)?;
        let net_flow = counter_delta(&current, &base, Attribute::Invested)
            - counter_delta(&current, &base, Attribute::Divested);
        let net_invested_local = counter_delta(&current, &base, Attribute::NetInvestedLocal);
        let realized_local = counter_delta(&current, &base, Attribute::RealizedGainLocal);
        let realized = counter_delta(&current, &base, Attribute::RealizedGain);
        let fluctuation = round_to_scale(
            open_local * (fx_close - fx_open) + fx_close * (net_invested_local + realized_local)
                - net_flow
                - realized,
            self.base_scale,
        );

        current.set_money(
            Attribute::Fluctuation,
            base.money_or_zero(Attribute::Fluctuation)? + fluctuation,
        )?;
        current.set_money(
            Attribute::Profit,
            base.money_or_zero(Attribute::Profit)? + valuation_change - net_flow,
        )?;

        bucket.replace_base(base);
        bucket.replace_current(current);
        Ok(())
    }

    /// Re-values an account's balance and sets its period fluctuation and
    /// profit. Portfolio accounts pass their positions' valuations, which are
    /// added after the cash fluctuation is derived.
    pub fn finalize_account(
        &mut self,
        bucket: &mut Bucket,
        holdings: Option<HoldingsValuation>,
    ) -> Result<()> {
        let Some(close) = self.close else {
            return Ok(());
        };
        let currency = bucket.currency().to_string();

        let mut base = bucket.base().full_snapshot();
        let open_cash = match self.open {
            Some(open) => {
                let rate = self.open_rates.value_at(&currency, open);
                let balance = base.money_or_zero(Attribute::Balance)?;
                base.set_rate(Attribute::ExchangeRate, rate)?;
                convert_to_base(balance, rate, self.base_scale)
            }
            None => base.money_or_zero(Attribute::Valuation)?,
        };

        let mut current = bucket.current().full_snapshot();
        let fx_close = self.close_rates.value_at(&currency, close);
        let close_cash = convert_to_base(
            current.money_or_zero(Attribute::Balance)?,
            fx_close,
            self.base_scale,
        );
        current.set_rate(Attribute::ExchangeRate, fx_close)?;

        let flows = counter_delta(&current, &base, Attribute::Income)
            - counter_delta(&current, &base, Attribute::Expense)
            + counter_delta(&current, &base, Attribute::TransfersIn)
            - counter_delta(&current, &base, Attribute::TransfersOut)
            + counter_delta(&current, &base, Attribute::TradesIn)
            - counter_delta(&current, &base, Attribute::TradesOut);
        let fluctuation = (close_cash - open_cash) - flows;

        let holdings = holdings.unwrap_or_default();
        let open_valuation = open_cash + holdings.open;
        let close_valuation = close_cash + holdings.close;
        let net_transfers = counter_delta(&current, &base, Attribute::TransfersIn)
            - counter_delta(&current, &base, Attribute::TransfersOut);

        base.set_money(Attribute::Valuation, open_valuation)?;
        current.set_money(Attribute::Valuation, close_valuation)?;
        current.set_money(
            Attribute::Fluctuation,
            base.money_or_zero(Attribute::Fluctuation)? + fluctuation,
        )?;
        current.set_money(
            Attribute::Profit,
            base.money_or_zero(Attribute::Profit)? + (close_valuation - open_valuation)
                - net_transfers,
        )?;

        if !fluctuation.is_zero() {
            debug!(
                "Account {} fluctuation {} over {:?}..{}",
                bucket.id(),
                fluctuation,
                self.open,
                close
            );
        }
        bucket.replace_base(base);
        bucket.replace_current(current);
        Ok(())
    }
}

fn position_security(bucket: &Bucket) -> Option<String> {
    match bucket.id() {
        BucketId::Position { security_id, .. } => Some(security_id.clone()),
        _ => None,
    }
}
