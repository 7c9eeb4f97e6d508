//! Provider traits for the collaborators this engine consumes.
//!
//! Storage, import and editing live outside this crate. These traits are the
//! narrow read-only seams through which the feed, the master data and the
//! price/rate series are handed in.

use super::ledger_model::Transaction;
use super::reference_model::{
    Account, AccountGroup, Category, Currency, Payee, Security, TaxBasis,
};
use crate::errors::Result;
use crate::market_data::{ExchangeRate, Quote};

/// Source of the date-sorted transaction feed.
pub trait TransactionFeedTrait: Send + Sync {
    /// Returns every transaction, ordered by ascending date.
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
}

/// Source of reference master data.
pub trait ReferenceDataTrait: Send + Sync {
    fn list_account_groups(&self) -> Result<Vec<AccountGroup>>;
    fn list_accounts(&self) -> Result<Vec<Account>>;
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn list_payees(&self) -> Result<Vec<Payee>>;
    fn list_tax_bases(&self) -> Result<Vec<TaxBasis>>;
    fn list_securities(&self) -> Result<Vec<Security>>;
    fn list_currencies(&self) -> Result<Vec<Currency>>;
}

/// Source of the price and exchange-rate master series.
pub trait MarketSeriesTrait: Send + Sync {
    fn list_exchange_rates(&self) -> Result<Vec<ExchangeRate>>;
    fn list_quotes(&self) -> Result<Vec<Quote>>;
}
