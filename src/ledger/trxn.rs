// src/ledger/trxn.rs

use async_stream::stream;
use chrono::NaiveDate;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

use super::require_identifier;
use crate::domain::{Account, NewTrxn, Trxn};
use crate::error::LedgerError;
use crate::money::Amount;
use crate::store::{LedgerStore, StoreError};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;

pub type TrxnStream = Pin<Box<dyn Stream<Item = Result<Trxn, LedgerError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResult {
    pub trxn: Trxn,
    /// False when the call replayed an operation that was already posted.
    pub created: bool,
}

/// Posts transactions against accounts.
pub struct TrxnCreator {
    store: Arc<dyn LedgerStore>,
    max_attempts: u32,
}

impl TrxnCreator {
    pub fn new(store: Arc<dyn LedgerStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    async fn load_account(&self, account_id: &str) -> Result<Account, LedgerError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    /// Posts `amount` to `account_id` under the idempotency key
    /// `operation_id`.
    ///
    /// A repeated call with the same payload returns the stored transaction
    /// with `created == false` and leaves the balance alone. Losing an
    /// optimistic-lock race reloads the account and tries again, up to
    /// `max_attempts` times.
    pub async fn create(
        &self,
        account_id: &str,
        amount: Amount,
        operation_id: &str,
        value_date: NaiveDate,
    ) -> Result<PostResult, LedgerError> {
        require_identifier("account_id", account_id)?;
        require_identifier("operation_id", operation_id)?;

        for attempt in 1..=self.max_attempts {
            let account = self.load_account(account_id).await?;
            if amount.currency() != account.balance.currency() {
                return Err(LedgerError::CurrencyMismatch {
                    account: account.balance.currency(),
                    amount: amount.currency(),
                });
            }

            let request = NewTrxn::new(operation_id, value_date, account.id, amount);
            if let Some(existing) = self.store.find_trxn(operation_id).await? {
                return replay(existing, &request);
            }

            let next = account.with_balance(account.balance.checked_add(&amount)?);
            match self.store.post_trxn(&next, request.clone()).await {
                Ok((trxn, account)) => {
                    info!(
                        operation_id,
                        account_id,
                        amount = %trxn.amount,
                        balance = %account.balance,
                        version = account.version,
                        "Trxn posted"
                    );
                    return Ok(PostResult {
                        trxn,
                        created: true,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(account_id, attempt, "Optimistic-lock conflict on account, retrying");
                }
                Err(StoreError::DuplicateOperation(_)) => {
                    // A concurrent request posted this operation first. Resolving it
                    // does not consume an attempt.
                    info!(operation_id, "Concurrent insert of operation, re-reading");
                    if let Some(existing) = self.store.find_trxn(operation_id).await? {
                        return replay(existing, &request);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::Contention(account_id.to_string()))
    }
}

fn replay(existing: Trxn, request: &NewTrxn) -> Result<PostResult, LedgerError> {
    if !existing.is_replay_of(request) {
        return Err(LedgerError::OperationReused(request.operation_id.clone()));
    }
    info!(operation_id = %existing.operation_id, "Trxn already created");
    Ok(PostResult {
        trxn: existing,
        created: false,
    })
}

/// Read side of the transaction log.
pub struct TrxnReader {
    store: Arc<dyn LedgerStore>,
}

impl TrxnReader {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, operation_id: &str) -> Result<Trxn, LedgerError> {
        require_identifier("operation_id", operation_id)?;
        self.store
            .find_trxn(operation_id)
            .await?
            .ok_or_else(|| LedgerError::TrxnNotFound(operation_id.to_string()))
    }

    /// Streams every transaction of `account_id` in posting order, fetching
    /// `page_size` rows per store round-trip.
    pub async fn list(&self, account_id: &str, page_size: u32) -> Result<TrxnStream, LedgerError> {
        require_identifier("account_id", account_id)?;
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        let limit = effective_page_size(page_size);
        let store = Arc::clone(&self.store);

        Ok(Box::pin(stream! {
            let mut after_id = 0;
            loop {
                let page = match store.list_trxns(account.id, after_id, limit).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(LedgerError::from(e));
                        break;
                    }
                };
                let exhausted = page.len() < limit as usize;
                for trxn in page {
                    after_id = trxn.id;
                    yield Ok(trxn);
                }
                if exhausted {
                    break;
                }
            }
        }))
    }
}

fn effective_page_size(requested: u32) -> u32 {
    match requested {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    }
}
