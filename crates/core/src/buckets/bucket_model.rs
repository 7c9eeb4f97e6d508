//! Aggregation buckets: one per account, position, payee, category, tax basis
//! or tag, plus group and kind totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::Result;
use crate::history::{History, Window};
use crate::ledger::{AccountKind, Transaction};
use crate::values::{Attribute, ValueLayout, Values};

/// What a bucket aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketKind {
    Deposit,
    Cash,
    Loan,
    Portfolio,
    /// A position: one security held in one portfolio account.
    Security,
    Payee,
    Category,
    TaxBasis,
    Tag,
}

impl BucketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKind::Deposit => "DEPOSIT",
            BucketKind::Cash => "CASH",
            BucketKind::Loan => "LOAN",
            BucketKind::Portfolio => "PORTFOLIO",
            BucketKind::Security => "SECURITY",
            BucketKind::Payee => "PAYEE",
            BucketKind::Category => "CATEGORY",
            BucketKind::TaxBasis => "TAX_BASIS",
            BucketKind::Tag => "TAG",
        }
    }

    /// Value layout of a leaf bucket of this kind.
    pub fn layout(&self) -> ValueLayout {
        match self {
            BucketKind::Deposit | BucketKind::Cash | BucketKind::Loan => ValueLayout::Account,
            BucketKind::Portfolio => ValueLayout::Portfolio,
            BucketKind::Security => ValueLayout::Position,
            BucketKind::Payee | BucketKind::Category | BucketKind::TaxBasis | BucketKind::Tag => {
                ValueLayout::Flow
            }
        }
    }

    pub fn is_account(&self) -> bool {
        matches!(
            self,
            BucketKind::Deposit | BucketKind::Cash | BucketKind::Loan | BucketKind::Portfolio
        )
    }
}

impl From<AccountKind> for BucketKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Deposit => BucketKind::Deposit,
            AccountKind::Cash => BucketKind::Cash,
            AccountKind::Loan => BucketKind::Loan,
            AccountKind::Portfolio => BucketKind::Portfolio,
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketId {
    Account(String),
    AccountGroup(String),
    KindTotal(BucketKind),
    Position {
        account_id: String,
        security_id: String,
    },
    Payee(String),
    Category(String),
    TaxBasis(String),
    Tag(String),
}

impl BucketId {
    pub fn position(account_id: &str, security_id: &str) -> Self {
        BucketId::Position {
            account_id: account_id.to_string(),
            security_id: security_id.to_string(),
        }
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketId::Account(id) => write!(f, "account:{}", id),
            BucketId::AccountGroup(id) => write!(f, "group:{}", id),
            BucketId::KindTotal(kind) => write!(f, "total:{}", kind),
            BucketId::Position {
                account_id,
                security_id,
            } => write!(f, "position:{}/{}", account_id, security_id),
            BucketId::Payee(id) => write!(f, "payee:{}", id),
            BucketId::Category(id) => write!(f, "category:{}", id),
            BucketId::TaxBasis(id) => write!(f, "tax_basis:{}", id),
            BucketId::Tag(id) => write!(f, "tag:{}", id),
        }
    }
}

/// Kind-specific behaviour composed into a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketExtension {
    /// Tracks card spending in the `Spend` counter.
    CreditCard,
}

impl BucketExtension {
    pub fn layout(&self) -> ValueLayout {
        match self {
            BucketExtension::CreditCard => ValueLayout::CreditCard,
        }
    }

    /// Extension bookkeeping for a signed amount posted to the account.
    ///
    /// Credit cards count the magnitude of every non-zero debit as spend.
    /// Credits never reduce it.
    pub fn on_posting(&self, values: &mut Values, amount: Decimal) -> Result<()> {
        match self {
            BucketExtension::CreditCard => {
                if amount < Decimal::ZERO {
                    values.add_money(Attribute::Spend, -amount)?;
                }
                Ok(())
            }
        }
    }
}

/// Aggregation unit with a current/base value pair and optional history.
///
/// Equality, ordering and hashing delegate to the identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    id: BucketId,
    kind: BucketKind,
    name: String,
    /// Local currency of the bucket's local-denominated attributes.
    currency: String,
    sort_tag: Option<String>,
    extension: Option<BucketExtension>,
    base: Values,
    current: Values,
    #[serde(skip)]
    history: Option<History>,
    has_foreign_currency: bool,
    children: Vec<BucketId>,
}

impl Bucket {
    fn with_layout(
        id: BucketId,
        kind: BucketKind,
        name: &str,
        currency: &str,
        layout: ValueLayout,
    ) -> Self {
        Bucket {
            id,
            kind,
            name: name.to_string(),
            currency: currency.to_string(),
            sort_tag: None,
            extension: None,
            base: Values::new(layout),
            current: Values::new(layout),
            history: None,
            has_foreign_currency: false,
            children: Vec::new(),
        }
    }

    /// Untracked leaf bucket: current and base only, no history.
    pub fn new(id: BucketId, kind: BucketKind, name: &str, currency: &str) -> Self {
        Self::with_layout(id, kind, name, currency, kind.layout())
    }

    /// Leaf bucket recording one snapshot per touching transaction.
    pub fn tracked(id: BucketId, kind: BucketKind, name: &str, currency: &str) -> Self {
        let mut bucket = Self::new(id, kind, name, currency);
        bucket.history = Some(History::new(bucket.base.full_snapshot()));
        bucket
    }

    /// Total over child buckets of one kind, in the base currency.
    pub fn aggregate(id: BucketId, kind: BucketKind, name: &str, base_currency: &str) -> Self {
        Self::with_layout(id, kind, name, base_currency, ValueLayout::Aggregate)
    }

    /// Fresh, unregistered bucket standing in for an absent one.
    pub fn orphan(id: BucketId, kind: BucketKind, currency: &str) -> Self {
        let name = id.to_string();
        Self::new(id, kind, &name, currency)
    }

    /// Composes a kind extension. Resets values to the extension's layout, so
    /// it must be applied before the first transaction.
    pub fn with_extension(mut self, extension: BucketExtension) -> Self {
        let layout = extension.layout();
        self.extension = Some(extension);
        self.base = Values::new(layout);
        self.current = Values::new(layout);
        if self.history.is_some() {
            self.history = Some(History::new(self.base.full_snapshot()));
        }
        self
    }

    pub fn with_sort_tag(mut self, sort_tag: Option<String>) -> Self {
        self.sort_tag = sort_tag;
        self
    }

    pub fn id(&self) -> &BucketId {
        &self.id
    }

    pub fn kind(&self) -> BucketKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn sort_tag(&self) -> Option<&str> {
        self.sort_tag.as_deref()
    }

    pub fn extension(&self) -> Option<BucketExtension> {
        self.extension
    }

    pub fn is_credit_card(&self) -> bool {
        self.extension == Some(BucketExtension::CreditCard)
    }

    pub fn base(&self) -> &Values {
        &self.base
    }

    pub fn current(&self) -> &Values {
        &self.current
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn children(&self) -> &[BucketId] {
        &self.children
    }

    pub fn has_foreign_currency(&self) -> bool {
        self.has_foreign_currency
    }

    pub(crate) fn set_has_foreign_currency(&mut self, foreign: bool) {
        self.has_foreign_currency = foreign;
    }

    /// True iff no transaction ever touched this bucket.
    pub fn is_idle(&self) -> bool {
        self.history.as_ref().map_or(true, History::is_idle)
    }

    /// Publishes the state produced by `transaction`, replacing current.
    pub fn register_transaction(&mut self, transaction: &Transaction, applied: Values) -> Result<()> {
        if let Some(history) = self.history.as_mut() {
            history.register_transaction(transaction, applied.full_snapshot())?;
        }
        self.current = applied;
        Ok(())
    }

    pub(crate) fn replace_current(&mut self, values: Values) {
        self.current = values;
    }

    pub(crate) fn replace_base(&mut self, values: Values) {
        self.base = values;
    }

    /// Rolls a child into this total. Current and base are summed
    /// independently.
    pub fn merge(&mut self, child: &Bucket) {
        self.current.add(&child.current);
        self.base.add(&child.base);
        self.has_foreign_currency |= child.has_foreign_currency;
        self.children.push(child.id.clone());
    }

    /// Current valuation minus base valuation.
    pub fn valuation_delta(&self) -> Decimal {
        let valuation = |values: &Values| {
            values
                .get(Attribute::Valuation)
                .and_then(|value| value.as_decimal())
                .unwrap_or_default()
        };
        valuation(&self.current) - valuation(&self.base)
    }

    /// Counter delta between base and current. `None` for instantaneous
    /// attributes and attributes outside the layout.
    pub fn delta(&self, attribute: Attribute) -> Option<Decimal> {
        self.current.delta(attribute, &self.base)
    }

    pub fn profit(&self) -> Decimal {
        self.delta(Attribute::Profit).unwrap_or_default()
    }

    /// Same bucket reconstructed for a window. Untracked buckets have nothing
    /// to replay and come back empty.
    pub fn windowed(&self, window: &Window) -> Bucket {
        let mut bucket = Bucket {
            children: Vec::new(),
            history: None,
            ..self.clone()
        };
        match self.history.as_ref() {
            Some(history) => {
                let windowed = history.windowed(window);
                bucket.base = windowed.base().full_snapshot();
                bucket.current = windowed.current().full_snapshot();
                bucket.history = Some(windowed);
            }
            None => {
                bucket.base = Values::new(self.base.layout());
                bucket.current = Values::new(self.current.layout());
            }
        }
        bucket
    }

    pub fn values_for_transaction(&self, transaction_id: &str) -> Option<Values> {
        self.history
            .as_ref()
            .and_then(|h| h.values_for_transaction(transaction_id))
            .cloned()
    }

    pub fn previous_values_for_transaction(&self, transaction_id: &str) -> Option<Values> {
        self.history
            .as_ref()
            .and_then(|h| h.previous_values_for_transaction(transaction_id))
            .cloned()
    }

    pub fn delta_value(&self, transaction_id: &str, attribute: Attribute) -> Option<Decimal> {
        self.history
            .as_ref()
            .and_then(|h| h.delta_value(transaction_id, attribute))
    }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Bucket {}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Bucket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
