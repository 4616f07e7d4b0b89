// src/domain/account.rs

use chrono::{DateTime, Utc};

use crate::money::Amount;

/// A single-currency account.
///
/// `id` is the storage key; `external_id` is the id clients address the
/// account by. `version` counts balance changes and doubles as the
/// optimistic-lock token when posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub external_id: String,
    pub balance: Amount,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Successor state after a balance change.
    pub fn with_balance(&self, balance: Amount) -> Self {
        Self {
            balance,
            version: self.version + 1,
            updated_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}
