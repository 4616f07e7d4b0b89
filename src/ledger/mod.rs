// src/ledger/mod.rs

// Business rules live here; transport (gRPC) and persistence (store) are
// injected on either side.

pub mod accounts;   // Account lifecycle
pub mod trxn;       // Postings and reads

pub use accounts::AccountService;
pub use trxn::{PostResult, TrxnCreator, TrxnReader, TrxnStream};

use crate::domain::is_valid_identifier;
use crate::error::LedgerError;

fn require_identifier(field: &str, value: &str) -> Result<(), LedgerError> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(LedgerError::InvalidArgument(format!(
            "{field} must be 1-128 characters of [A-Za-z0-9._:-]"
        )))
    }
}
