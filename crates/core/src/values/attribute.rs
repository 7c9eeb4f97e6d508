//! Attribute tags and their static metadata.
//!
//! Every numeric or date slot a bucket can hold is named by an [`Attribute`].
//! The classification of an attribute (its kind, whether it accumulates across
//! transactions, which currency it is denominated in) never changes at runtime,
//! so it lives in a `const` table rather than on the values themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeKind {
    Money,
    Ratio,
    Rate,
    Date,
    Units,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Money => "MONEY",
            AttributeKind::Ratio => "RATIO",
            AttributeKind::Rate => "RATE",
            AttributeKind::Date => "DATE",
            AttributeKind::Units => "UNITS",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currency a money attribute is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Denomination {
    /// The analysis base currency. Safe to sum across buckets.
    Base,
    /// The bucket's own currency (account or security currency).
    Local,
    /// Not a money amount.
    None,
}

/// Static metadata of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMeta {
    pub kind: AttributeKind,
    /// Accumulates across transactions (a period flow) rather than describing
    /// the instantaneous state.
    pub is_counter: bool,
    /// Whether a counter keeps its accumulated value in a counter-only
    /// snapshot. Period-scoped counters restart at zero instead.
    pub carries_forward: bool,
    pub denomination: Denomination,
}

impl AttributeMeta {
    const fn state(kind: AttributeKind, denomination: Denomination) -> Self {
        AttributeMeta {
            kind,
            is_counter: false,
            carries_forward: false,
            denomination,
        }
    }

    const fn counter(kind: AttributeKind, denomination: Denomination) -> Self {
        AttributeMeta {
            kind,
            is_counter: true,
            carries_forward: true,
            denomination,
        }
    }

    const fn period_counter(kind: AttributeKind, denomination: Denomination) -> Self {
        AttributeMeta {
            kind,
            is_counter: true,
            carries_forward: false,
            denomination,
        }
    }
}

/// Tag naming a numeric or date slot within a bucket's value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    // --- Instantaneous state ---
    /// Account balance in the account currency.
    Balance,
    /// Market value in the base currency.
    Valuation,
    /// Market value in the bucket's own currency.
    LocalValuation,
    /// Remaining cost of held units, local currency.
    CostBasis,
    /// Units held.
    Units,
    /// Effective price of one unit.
    Price,
    /// Effective rate local -> base.
    ExchangeRate,
    /// Unrealized gain relative to cost basis.
    GainRatio,
    /// Date of the last transaction applied.
    LastActivity,

    // --- Counters ---
    Income,
    Expense,
    TransfersIn,
    TransfersOut,
    /// Sale proceeds booked into a portfolio's cash.
    TradesIn,
    /// Purchase payments booked out of a portfolio's cash.
    TradesOut,
    /// Purchases of a position, base currency.
    Invested,
    /// Sale proceeds of a position, base currency.
    Divested,
    /// Purchases minus sale proceeds in the position's currency.
    NetInvestedLocal,
    RealizedGain,
    /// Realized gain in the position's currency.
    RealizedGainLocal,
    Growth,
    Fluctuation,
    Profit,
    /// Credit-card spending in the account currency. Restarts every period.
    Spend,
    UnitsIn,
    UnitsOut,
}

impl Attribute {
    pub const fn meta(self) -> AttributeMeta {
        use AttributeKind as K;
        use Denomination as D;
        match self {
            Attribute::Balance => AttributeMeta::state(K::Money, D::Local),
            Attribute::Valuation => AttributeMeta::state(K::Money, D::Base),
            Attribute::LocalValuation => AttributeMeta::state(K::Money, D::Local),
            Attribute::CostBasis => AttributeMeta::state(K::Money, D::Local),
            Attribute::Units => AttributeMeta::state(K::Units, D::None),
            Attribute::Price => AttributeMeta::state(K::Rate, D::None),
            Attribute::ExchangeRate => AttributeMeta::state(K::Rate, D::None),
            Attribute::GainRatio => AttributeMeta::state(K::Ratio, D::None),
            Attribute::LastActivity => AttributeMeta::state(K::Date, D::None),
            Attribute::Income
            | Attribute::Expense
            | Attribute::TransfersIn
            | Attribute::TransfersOut
            | Attribute::TradesIn
            | Attribute::TradesOut
            | Attribute::Invested
            | Attribute::Divested
            | Attribute::RealizedGain
            | Attribute::Growth
            | Attribute::Fluctuation
            | Attribute::Profit => AttributeMeta::counter(K::Money, D::Base),
            Attribute::NetInvestedLocal | Attribute::RealizedGainLocal => {
                AttributeMeta::counter(K::Money, D::Local)
            }
            Attribute::Spend => AttributeMeta::period_counter(K::Money, D::Local),
            Attribute::UnitsIn | Attribute::UnitsOut => AttributeMeta::counter(K::Units, D::None),
        }
    }

    pub fn kind(self) -> AttributeKind {
        self.meta().kind
    }

    pub fn is_counter(self) -> bool {
        self.meta().is_counter
    }

    pub fn carries_forward(self) -> bool {
        self.meta().carries_forward
    }

    pub fn denomination(self) -> Denomination {
        self.meta().denomination
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Balance => "BALANCE",
            Attribute::Valuation => "VALUATION",
            Attribute::LocalValuation => "LOCAL_VALUATION",
            Attribute::CostBasis => "COST_BASIS",
            Attribute::Units => "UNITS",
            Attribute::Price => "PRICE",
            Attribute::ExchangeRate => "EXCHANGE_RATE",
            Attribute::GainRatio => "GAIN_RATIO",
            Attribute::LastActivity => "LAST_ACTIVITY",
            Attribute::Income => "INCOME",
            Attribute::Expense => "EXPENSE",
            Attribute::TransfersIn => "TRANSFERS_IN",
            Attribute::TransfersOut => "TRANSFERS_OUT",
            Attribute::TradesIn => "TRADES_IN",
            Attribute::TradesOut => "TRADES_OUT",
            Attribute::Invested => "INVESTED",
            Attribute::Divested => "DIVESTED",
            Attribute::NetInvestedLocal => "NET_INVESTED_LOCAL",
            Attribute::RealizedGain => "REALIZED_GAIN",
            Attribute::RealizedGainLocal => "REALIZED_GAIN_LOCAL",
            Attribute::Growth => "GROWTH",
            Attribute::Fluctuation => "FLUCTUATION",
            Attribute::Profit => "PROFIT",
            Attribute::Spend => "SPEND",
            Attribute::UnitsIn => "UNITS_IN",
            Attribute::UnitsOut => "UNITS_OUT",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const ACCOUNT_ATTRIBUTES: &[Attribute] = &[
    Attribute::Balance,
    Attribute::Valuation,
    Attribute::ExchangeRate,
    Attribute::LastActivity,
    Attribute::Income,
    Attribute::Expense,
    Attribute::TransfersIn,
    Attribute::TransfersOut,
    Attribute::Fluctuation,
    Attribute::Profit,
];

const CREDIT_CARD_ATTRIBUTES: &[Attribute] = &[
    Attribute::Balance,
    Attribute::Valuation,
    Attribute::ExchangeRate,
    Attribute::LastActivity,
    Attribute::Income,
    Attribute::Expense,
    Attribute::TransfersIn,
    Attribute::TransfersOut,
    Attribute::Fluctuation,
    Attribute::Profit,
    Attribute::Spend,
];

const PORTFOLIO_ATTRIBUTES: &[Attribute] = &[
    Attribute::Balance,
    Attribute::Valuation,
    Attribute::ExchangeRate,
    Attribute::LastActivity,
    Attribute::Income,
    Attribute::Expense,
    Attribute::TransfersIn,
    Attribute::TransfersOut,
    Attribute::TradesIn,
    Attribute::TradesOut,
    Attribute::Fluctuation,
    Attribute::Profit,
];

const POSITION_ATTRIBUTES: &[Attribute] = &[
    Attribute::Units,
    Attribute::Price,
    Attribute::ExchangeRate,
    Attribute::LocalValuation,
    Attribute::Valuation,
    Attribute::CostBasis,
    Attribute::GainRatio,
    Attribute::LastActivity,
    Attribute::UnitsIn,
    Attribute::UnitsOut,
    Attribute::Invested,
    Attribute::Divested,
    Attribute::NetInvestedLocal,
    Attribute::RealizedGain,
    Attribute::RealizedGainLocal,
    Attribute::Growth,
    Attribute::Fluctuation,
    Attribute::Profit,
];

const FLOW_ATTRIBUTES: &[Attribute] = &[
    Attribute::Income,
    Attribute::Expense,
    Attribute::Profit,
    Attribute::LastActivity,
];

const AGGREGATE_ATTRIBUTES: &[Attribute] = &[
    Attribute::Valuation,
    Attribute::Income,
    Attribute::Expense,
    Attribute::TransfersIn,
    Attribute::TransfersOut,
    Attribute::TradesIn,
    Attribute::TradesOut,
    Attribute::Invested,
    Attribute::Divested,
    Attribute::RealizedGain,
    Attribute::Growth,
    Attribute::Fluctuation,
    Attribute::Profit,
];

/// The closed attribute set a [`Values`](super::Values) instance may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueLayout {
    /// Deposit, cash and loan accounts.
    Account,
    /// Loan accounts classified as credit cards.
    CreditCard,
    /// Portfolio accounts (cash side).
    Portfolio,
    /// One security held in one portfolio.
    Position,
    /// Payees, transaction categories, tax bases and tags.
    Flow,
    /// Group and grand totals rolled up from child buckets.
    Aggregate,
}

impl ValueLayout {
    pub fn attributes(&self) -> &'static [Attribute] {
        match self {
            ValueLayout::Account => ACCOUNT_ATTRIBUTES,
            ValueLayout::CreditCard => CREDIT_CARD_ATTRIBUTES,
            ValueLayout::Portfolio => PORTFOLIO_ATTRIBUTES,
            ValueLayout::Position => POSITION_ATTRIBUTES,
            ValueLayout::Flow => FLOW_ATTRIBUTES,
            ValueLayout::Aggregate => AGGREGATE_ATTRIBUTES,
        }
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.attributes().contains(&attribute)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueLayout::Account => "ACCOUNT",
            ValueLayout::CreditCard => "CREDIT_CARD",
            ValueLayout::Portfolio => "PORTFOLIO",
            ValueLayout::Position => "POSITION",
            ValueLayout::Flow => "FLOW",
            ValueLayout::Aggregate => "AGGREGATE",
        }
    }
}

impl fmt::Display for ValueLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
