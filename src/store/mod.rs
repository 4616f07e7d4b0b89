// src/store/mod.rs

// Persistence boundary: the services only ever see `LedgerStore`; the sqlx
// pool never leaves `sqlite`.

pub mod traits;     // Store contract + errors
mod rows;           // Row mapping helpers
pub mod sqlite;     // SQLite implementation

pub use sqlite::SqliteLedgerStore;
pub use traits::{LedgerStore, StoreError};

#[cfg(test)]
pub use traits::MockLedgerStore;
