//! Reference master data: read-only identity and classification records.

use serde::{Deserialize, Serialize};

/// Account kinds the pipeline processes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Deposit,
    Cash,
    Loan,
    Portfolio,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Deposit => "DEPOSIT",
            AccountKind::Cash => "CASH",
            AccountKind::Loan => "LOAN",
            AccountKind::Portfolio => "PORTFOLIO",
        }
    }
}

/// Classification of an account group, selecting kind-specific behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupClassification {
    #[default]
    Standard,
    /// Loan accounts that track card spending.
    CreditCard,
}

/// A category of accounts (e.g. "Checking", "Credit Cards").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountGroup {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub classification: GroupClassification,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub currency: String,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

/// Transaction category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tax_basis_id: Option<String>,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub payee_type: Option<String>,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

/// Line of the tax report a category rolls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBasis {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub id: String,
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub sort_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub code: String,
    /// Number of minor-unit digits (2 for USD, 0 for JPY).
    pub minor_units: u32,
}
