//! Ledger module - transaction feed, reference master data and provider traits.

mod in_memory;
mod ledger_model;
mod ledger_traits;
mod reference_data;
mod reference_model;

pub use in_memory::InMemoryLedger;
pub use ledger_model::{Transaction, TransactionKind};
pub use ledger_traits::{MarketSeriesTrait, ReferenceDataTrait, TransactionFeedTrait};
pub use reference_data::ReferenceData;
pub use reference_model::{
    Account, AccountGroup, AccountKind, Category, Currency, GroupClassification, Payee, Security,
    TaxBasis,
};
