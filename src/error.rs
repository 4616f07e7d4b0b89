// src/error.rs

use thiserror::Error;
use tonic::Status;

use crate::money::{Currency, MoneyError};
use crate::store::StoreError;

/// Failures surfaced by the ledger services.
///
/// Each variant maps onto exactly one gRPC status code; storage details are
/// logged and never returned to callers.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Transaction {0} not found")]
    TrxnNotFound(String),

    #[error("Currency mismatch: account is in {account}, amount is in {amount}")]
    CurrencyMismatch { account: Currency, amount: Currency },

    #[error("Account {account_id} already exists in {currency}")]
    AccountExists { account_id: String, currency: Currency },

    #[error("Operation {0} was already used for a different transaction")]
    OperationReused(String),

    #[error("Balance overflow")]
    Overflow,

    #[error("Account {0} is under contention, retry later")]
    Contention(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MoneyError> for LedgerError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::Overflow => LedgerError::Overflow,
            MoneyError::CurrencyMismatch { expected, actual } => LedgerError::CurrencyMismatch {
                account: expected,
                amount: actual,
            },
            other => LedgerError::InvalidArgument(other.to_string()),
        }
    }
}

impl From<LedgerError> for Status {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidArgument(_) | LedgerError::CurrencyMismatch { .. } => {
                Status::invalid_argument(e.to_string())
            }
            LedgerError::AccountNotFound(_) | LedgerError::TrxnNotFound(_) => {
                Status::not_found(e.to_string())
            }
            LedgerError::AccountExists { .. } | LedgerError::OperationReused(_) => {
                Status::already_exists(e.to_string())
            }
            LedgerError::Overflow => Status::out_of_range(e.to_string()),
            LedgerError::Contention(_) => Status::aborted(e.to_string()),
            LedgerError::Store(inner) => {
                tracing::error!(error = %inner, "Storage failure");
                Status::internal("Internal storage error")
            }
        }
    }
}
