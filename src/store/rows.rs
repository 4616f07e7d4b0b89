// src/store/rows.rs

//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::traits::StoreError;
use crate::domain::{Account, Trxn};
use crate::money::{Amount, Currency};

/// Shared SELECT column list for account queries.
pub const ACCOUNT_COLUMNS: &str =
    "id, external_id, currency, balance_minor, version, created_at, updated_at";

/// Shared SELECT column list for trxn queries; expects `trxns t JOIN accounts a`.
pub const TRXN_COLUMNS: &str = "t.id, t.operation_id, t.value_date, t.account_id, \
     a.external_id AS account_external_id, t.currency, t.amount_minor, t.created_at";

fn currency(row: &SqliteRow) -> Result<Currency, StoreError> {
    let code: String = row.try_get("currency")?;
    Currency::parse(&code).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub fn row_to_account(row: &SqliteRow) -> Result<Account, StoreError> {
    let currency = currency(row)?;
    let balance_minor: i64 = row.try_get("balance_minor")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at")?;

    Ok(Account {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        balance: Amount::new(currency, balance_minor),
        version: row.try_get("version")?,
        created_at,
        updated_at,
    })
}

pub fn row_to_trxn(row: &SqliteRow) -> Result<Trxn, StoreError> {
    let currency = currency(row)?;
    let amount_minor: i64 = row.try_get("amount_minor")?;
    let value_date: NaiveDate = row.try_get("value_date")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Trxn {
        id: row.try_get("id")?,
        operation_id: row.try_get("operation_id")?,
        value_date,
        account_id: row.try_get("account_id")?,
        account_external_id: row.try_get("account_external_id")?,
        amount: Amount::new(currency, amount_minor),
        created_at,
    })
}
