// src/ledger/accounts.rs

use std::sync::Arc;
use tracing::info;

use super::require_identifier;
use crate::domain::Account;
use crate::error::LedgerError;
use crate::money::Currency;
use crate::store::{LedgerStore, StoreError};

pub struct AccountService {
    store: Arc<dyn LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Opens `account_id` in `currency_code`.
    ///
    /// Creating an account that already exists in the same currency returns
    /// the stored account unchanged.
    pub async fn create(&self, account_id: &str, currency_code: &str) -> Result<Account, LedgerError> {
        require_identifier("account_id", account_id)?;
        let currency = Currency::parse(currency_code)?;

        match self.store.create_account(account_id, currency).await {
            Ok(account) => {
                info!(account_id, %currency, "Account created");
                Ok(account)
            }
            Err(StoreError::AlreadyExists(_)) => {
                let existing = self.get(account_id).await?;
                if existing.balance.currency() != currency {
                    return Err(LedgerError::AccountExists {
                        account_id: account_id.to_string(),
                        currency: existing.balance.currency(),
                    });
                }
                info!(account_id, "Account already created");
                Ok(existing)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, account_id: &str) -> Result<Account, LedgerError> {
        require_identifier("account_id", account_id)?;
        self.store
            .find_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }
}
