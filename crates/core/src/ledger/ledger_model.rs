//! Transaction feed domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a transaction moves money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Income or expense against a payee and a category.
    #[default]
    Standard,
    /// Money moving between two of the ledger's own accounts. Each leg is
    /// its own transaction.
    Transfer,
    /// Portfolio cash paid for units of a security.
    Buy,
    /// Units of a security sold into portfolio cash.
    Sell,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Standard => "STANDARD",
            TransactionKind::Transfer => "TRANSFER",
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
        }
    }
}

/// One entry of the immutable, date-sorted transaction feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub account_id: String,
    #[serde(default)]
    pub kind: TransactionKind,
    /// Signed amount in the account currency: credits positive, debits negative.
    pub amount: Decimal,
    #[serde(default)]
    pub payee_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub security_id: Option<String>,
    /// Units bought or sold (always positive) for trades.
    #[serde(default)]
    pub units: Option<Decimal>,
    /// Counter account of a transfer leg. Informational.
    #[serde(default)]
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Transaction {
    /// A standard income/expense transaction.
    pub fn standard(
        id: impl Into<String>,
        date: NaiveDate,
        account_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Transaction {
            id: id.into(),
            date,
            account_id: account_id.into(),
            kind: TransactionKind::Standard,
            amount,
            payee_id: None,
            category_id: None,
            security_id: None,
            units: None,
            transfer_account_id: None,
            tags: Vec::new(),
        }
    }

    pub fn transfer(
        id: impl Into<String>,
        date: NaiveDate,
        account_id: impl Into<String>,
        counter_account_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Transaction {
            kind: TransactionKind::Transfer,
            transfer_account_id: Some(counter_account_id.into()),
            ..Transaction::standard(id, date, account_id, amount)
        }
    }

    /// A trade. `amount` is the signed cash movement: negative for a buy,
    /// positive for a sell.
    pub fn trade(
        id: impl Into<String>,
        date: NaiveDate,
        account_id: impl Into<String>,
        kind: TransactionKind,
        security_id: impl Into<String>,
        units: Decimal,
        amount: Decimal,
    ) -> Self {
        Transaction {
            kind,
            security_id: Some(security_id.into()),
            units: Some(units),
            ..Transaction::standard(id, date, account_id, amount)
        }
    }

    pub fn with_payee(mut self, payee_id: impl Into<String>) -> Self {
        self.payee_id = Some(payee_id.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}
