//! In-memory provider implementing every collaborator trait.

use super::ledger_model::Transaction;
use super::ledger_traits::{MarketSeriesTrait, ReferenceDataTrait, TransactionFeedTrait};
use super::reference_model::{
    Account, AccountGroup, Category, Currency, Payee, Security, TaxBasis,
};
use crate::errors::Result;
use crate::market_data::{ExchangeRate, Quote};

/// A complete ledger held in memory.
///
/// Useful for embedding callers that already hold their data, and as the
/// fixture type for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    pub account_groups: Vec<AccountGroup>,
    pub accounts: Vec<Account>,
    pub categories: Vec<Category>,
    pub payees: Vec<Payee>,
    pub tax_bases: Vec<TaxBasis>,
    pub securities: Vec<Security>,
    pub currencies: Vec<Currency>,
    pub transactions: Vec<Transaction>,
    pub exchange_rates: Vec<ExchangeRate>,
    pub quotes: Vec<Quote>,
}

impl TransactionFeedTrait for InMemoryLedger {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }
}

impl ReferenceDataTrait for InMemoryLedger {
    fn list_account_groups(&self) -> Result<Vec<AccountGroup>> {
        Ok(self.account_groups.clone())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    fn list_payees(&self) -> Result<Vec<Payee>> {
        Ok(self.payees.clone())
    }

    fn list_tax_bases(&self) -> Result<Vec<TaxBasis>> {
        Ok(self.tax_bases.clone())
    }

    fn list_securities(&self) -> Result<Vec<Security>> {
        Ok(self.securities.clone())
    }

    fn list_currencies(&self) -> Result<Vec<Currency>> {
        Ok(self.currencies.clone())
    }
}

impl MarketSeriesTrait for InMemoryLedger {
    fn list_exchange_rates(&self) -> Result<Vec<ExchangeRate>> {
        Ok(self.exchange_rates.clone())
    }

    fn list_quotes(&self) -> Result<Vec<Quote>> {
        Ok(self.quotes.clone())
    }
}
