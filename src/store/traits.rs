// src/store/traits.rs

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::{Account, NewTrxn, Trxn};
use crate::money::Currency;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An account with this external id already exists.
    #[error("Account '{0}' already exists")]
    AlreadyExists(String),

    /// A transaction with this operation id was committed first.
    #[error("Operation '{0}' already posted")]
    DuplicateOperation(String),

    /// The account moved on since it was read.
    #[error("Account {account_id} is no longer at version {expected}")]
    VersionConflict { account_id: i64, expected: i64 },

    /// Stored data could not be mapped back into domain types.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

// ==============================================================================
// Ledger persistence contract
// ==============================================================================

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Opens an account with a zero balance at version 0.
    async fn create_account(
        &self,
        external_id: &str,
        currency: Currency,
    ) -> Result<Account, StoreError>;

    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, StoreError>;

    async fn find_trxn(&self, operation_id: &str) -> Result<Option<Trxn>, StoreError>;

    /// Inserts `trxn` and moves the account to `next` in one atomic step.
    ///
    /// `next` is the successor state from [`Account::with_balance`]; the write
    /// only succeeds while the stored row is still at `next.version - 1`.
    /// On failure nothing is written.
    async fn post_trxn(&self, next: &Account, trxn: NewTrxn) -> Result<(Trxn, Account), StoreError>;

    /// Transactions of `account_id` with an id greater than `after_id`, in
    /// posting order.
    async fn list_trxns(
        &self,
        account_id: i64,
        after_id: i64,
        limit: u32,
    ) -> Result<Vec<Trxn>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
