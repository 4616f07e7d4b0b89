// src/domain/trxn.rs

use chrono::{DateTime, NaiveDate, Utc};

use crate::money::Amount;

/// A posted transaction.
///
/// `account_external_id` is denormalised from the owning account so reads
/// can be answered without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trxn {
    pub id: i64,
    pub operation_id: String,
    pub value_date: NaiveDate,
    pub account_id: i64,
    pub account_external_id: String,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

/// A transaction that has not been posted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrxn {
    pub operation_id: String,
    pub value_date: NaiveDate,
    pub account_id: i64,
    pub amount: Amount,
}

impl NewTrxn {
    pub fn new(operation_id: &str, value_date: NaiveDate, account_id: i64, amount: Amount) -> Self {
        Self {
            operation_id: operation_id.to_string(),
            value_date,
            account_id,
            amount,
        }
    }
}

impl Trxn {
    /// True when `request` would post exactly this transaction again.
    pub fn is_replay_of(&self, request: &NewTrxn) -> bool {
        self.operation_id == request.operation_id
            && self.account_id == request.account_id
            && self.amount == request.amount
            && self.value_date == request.value_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn replay_detection_compares_payload() {
        let usd = Currency::parse("USD").unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let trxn = Trxn {
            id: 1,
            operation_id: "op".to_string(),
            value_date: date,
            account_id: 3,
            account_external_id: "acc".to_string(),
            amount: Amount::new(usd, 100),
            created_at: Utc::now(),
        };

        assert!(trxn.is_replay_of(&NewTrxn::new("op", date, 3, Amount::new(usd, 100))));
        assert!(!trxn.is_replay_of(&NewTrxn::new("op", date, 3, Amount::new(usd, 101))));
        assert!(!trxn.is_replay_of(&NewTrxn::new("op", date, 4, Amount::new(usd, 100))));
        let later = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert!(!trxn.is_replay_of(&NewTrxn::new("op", later, 3, Amount::new(usd, 100))));
    }
}
