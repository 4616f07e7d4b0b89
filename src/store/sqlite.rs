// src/store/sqlite.rs

//! `SQLite` implementation of the `LedgerStore` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use super::rows::{ACCOUNT_COLUMNS, TRXN_COLUMNS, row_to_account, row_to_trxn};
use super::traits::{LedgerStore, StoreError};
use crate::domain::{Account, NewTrxn, Trxn};
use crate::money::Currency;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and applies pending
    /// migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database.
    ///
    /// An in-memory `SQLite` database lives and dies with its connection, so
    /// the pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("Migration failed: {e}")))
    }

    /// Get a reference to the underlying pool (for testing only).
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn create_account(
        &self,
        external_id: &str,
        currency: Currency,
    ) -> Result<Account, StoreError> {
        let query = format!(
            "INSERT INTO accounts (external_id, currency, balance_minor, version, created_at) \
             VALUES (?, ?, 0, 0, ?) RETURNING {ACCOUNT_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(external_id)
            .bind(currency.code())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyExists(external_id.to_string())
                } else {
                    e.into()
                }
            })?;

        row_to_account(&row)
    }

    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE external_id = ?");

        sqlx::query(&query)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_account)
            .transpose()
    }

    async fn find_trxn(&self, operation_id: &str) -> Result<Option<Trxn>, StoreError> {
        let query = format!(
            "SELECT {TRXN_COLUMNS} FROM trxns t JOIN accounts a ON a.id = t.account_id \
             WHERE t.operation_id = ?"
        );

        sqlx::query(&query)
            .bind(operation_id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_trxn)
            .transpose()
    }

    async fn post_trxn(&self, next: &Account, trxn: NewTrxn) -> Result<(Trxn, Account), StoreError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` on an early return rolls everything back.
        let inserted = sqlx::query(
            "INSERT INTO trxns (operation_id, value_date, account_id, currency, amount_minor, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&trxn.operation_id)
        .bind(trxn.value_date)
        .bind(trxn.account_id)
        .bind(trxn.amount.currency().code())
        .bind(trxn.amount.minor_units())
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateOperation(trxn.operation_id.clone())
            } else {
                e.into()
            }
        })?;

        let expected = next.version - 1;
        let updated = sqlx::query(
            "UPDATE accounts SET balance_minor = ?, version = ?, updated_at = ? \
             WHERE id = ? AND version = ?",
        )
        .bind(next.balance.minor_units())
        .bind(next.version)
        .bind(next.updated_at)
        .bind(next.id)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::VersionConflict {
                account_id: next.id,
                expected,
            });
        }

        tx.commit().await?;

        let posted = Trxn {
            id: inserted.last_insert_rowid(),
            operation_id: trxn.operation_id,
            value_date: trxn.value_date,
            account_id: trxn.account_id,
            account_external_id: next.external_id.clone(),
            amount: trxn.amount,
            created_at,
        };
        Ok((posted, next.clone()))
    }

    async fn list_trxns(
        &self,
        account_id: i64,
        after_id: i64,
        limit: u32,
    ) -> Result<Vec<Trxn>, StoreError> {
        let query = format!(
            "SELECT {TRXN_COLUMNS} FROM trxns t JOIN accounts a ON a.id = t.account_id \
             WHERE t.account_id = ? AND t.id > ? ORDER BY t.id LIMIT ?"
        );

        let rows = sqlx::query(&query)
            .bind(account_id)
            .bind(after_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_trxn).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
