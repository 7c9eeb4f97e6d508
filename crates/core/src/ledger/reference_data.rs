//! Indexed, immutable view of the reference master data for one pass.

use log::warn;
use std::collections::HashMap;

use super::ledger_traits::ReferenceDataTrait;
use super::reference_model::{
    Account, AccountGroup, AccountKind, Category, GroupClassification, Payee, Security, TaxBasis,
};
use crate::errors::Result;

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    groups: Vec<AccountGroup>,
    accounts: Vec<Account>,
    categories: Vec<Category>,
    payees: Vec<Payee>,
    tax_bases: Vec<TaxBasis>,
    securities: Vec<Security>,
    group_index: HashMap<String, usize>,
    account_index: HashMap<String, usize>,
    category_index: HashMap<String, usize>,
    payee_index: HashMap<String, usize>,
    tax_basis_index: HashMap<String, usize>,
    security_index: HashMap<String, usize>,
    currency_scales: HashMap<String, u32>,
    default_scale: u32,
}

fn index_by<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (id(item).to_string(), i))
        .collect()
}

impl ReferenceData {
    /// Loads every record from the provider.
    ///
    /// Accounts whose group is unknown are dropped with a warning: without a
    /// group there is no kind to process them as.
    pub fn load(provider: &dyn ReferenceDataTrait, default_scale: u32) -> Result<Self> {
        let groups = provider.list_account_groups()?;
        let group_index = index_by(&groups, |g| g.id.as_str());

        let accounts: Vec<Account> = provider
            .list_accounts()?
            .into_iter()
            .filter(|account| {
                let known = group_index.contains_key(&account.group_id);
                if !known {
                    warn!(
                        "Account {} references unknown group {}. Ignored.",
                        account.id, account.group_id
                    );
                }
                known
            })
            .collect();

        let categories = provider.list_categories()?;
        let payees = provider.list_payees()?;
        let tax_bases = provider.list_tax_bases()?;
        let securities = provider.list_securities()?;
        let currency_scales = provider
            .list_currencies()?
            .into_iter()
            .map(|c| (c.code, c.minor_units))
            .collect();

        Ok(ReferenceData {
            account_index: index_by(&accounts, |a| a.id.as_str()),
            category_index: index_by(&categories, |c| c.id.as_str()),
            payee_index: index_by(&payees, |p| p.id.as_str()),
            tax_basis_index: index_by(&tax_bases, |t| t.id.as_str()),
            security_index: index_by(&securities, |s| s.id.as_str()),
            group_index,
            groups,
            accounts,
            categories,
            payees,
            tax_bases,
            securities,
            currency_scales,
            default_scale,
        })
    }

    pub fn account_groups(&self) -> &[AccountGroup] {
        &self.groups
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn payees(&self) -> &[Payee] {
        &self.payees
    }

    pub fn tax_bases(&self) -> &[TaxBasis] {
        &self.tax_bases
    }

    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    pub fn account_group(&self, id: &str) -> Option<&AccountGroup> {
        self.group_index.get(id).map(|i| &self.groups[*i])
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.account_index.get(id).map(|i| &self.accounts[*i])
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index.get(id).map(|i| &self.categories[*i])
    }

    pub fn payee(&self, id: &str) -> Option<&Payee> {
        self.payee_index.get(id).map(|i| &self.payees[*i])
    }

    pub fn tax_basis(&self, id: &str) -> Option<&TaxBasis> {
        self.tax_basis_index.get(id).map(|i| &self.tax_bases[*i])
    }

    pub fn security(&self, id: &str) -> Option<&Security> {
        self.security_index.get(id).map(|i| &self.securities[*i])
    }

    /// Kind of an account, taken from its group.
    pub fn account_kind(&self, account_id: &str) -> Option<AccountKind> {
        let account = self.account(account_id)?;
        self.account_group(&account.group_id).map(|g| g.kind)
    }

    pub fn is_credit_card(&self, account_id: &str) -> bool {
        self.account(account_id)
            .and_then(|a| self.account_group(&a.group_id))
            .map(|g| g.kind == AccountKind::Loan && g.classification == GroupClassification::CreditCard)
            .unwrap_or(false)
    }

    /// Minor-unit digits of a currency, falling back to the configured default.
    pub fn currency_scale(&self, code: &str) -> u32 {
        self.currency_scales
            .get(code)
            .copied()
            .unwrap_or(self.default_scale)
    }
}
