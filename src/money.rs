// src/money.rs

//! Exact monetary amounts.
//!
//! Amounts are kept as a signed count of the currency's minor units (cents for
//! USD, yen for JPY, fils for BHD). Nothing in the ledger ever goes through a
//! float; the only conversion boundary is `google.type.Money` on the wire.

use std::fmt;
use thiserror::Error;

use crate::proto::google::r#type::Money;

const NANOS_PER_UNIT: i64 = 1_000_000_000;

/// ISO 4217 codes accepted by the ledger, with their minor-unit exponent.
/// Kept sorted by code for binary search.
const CURRENCIES: &[(&str, u32)] = &[
    ("AED", 2),
    ("AUD", 2),
    ("BHD", 3),
    ("BRL", 2),
    ("CAD", 2),
    ("CHF", 2),
    ("CLP", 0),
    ("CNY", 2),
    ("CZK", 2),
    ("DKK", 2),
    ("EUR", 2),
    ("GBP", 2),
    ("HKD", 2),
    ("HUF", 2),
    ("IDR", 2),
    ("ILS", 2),
    ("INR", 2),
    ("ISK", 0),
    ("JOD", 3),
    ("JPY", 0),
    ("KRW", 0),
    ("KWD", 3),
    ("MXN", 2),
    ("NOK", 2),
    ("NZD", 2),
    ("OMR", 3),
    ("PLN", 2),
    ("RUB", 2),
    ("SAR", 2),
    ("SEK", 2),
    ("SGD", 2),
    ("THB", 2),
    ("TND", 3),
    ("TRY", 2),
    ("UAH", 2),
    ("USD", 2),
    ("VND", 0),
    ("ZAR", 2),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unknown currency code '{0}'")]
    UnknownCurrency(String),

    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    #[error("Invalid money value: {0}")]
    InvalidMoney(&'static str),

    #[error("Amount has more precision than {0} allows")]
    Precision(Currency),

    #[error("Amount overflow")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    code: &'static str,
    exponent: u32,
}

impl Currency {
    /// Looks up an uppercase ISO 4217 alphabetic code.
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        CURRENCIES
            .binary_search_by(|(c, _)| (*c).cmp(code))
            .map(|idx| {
                let (code, exponent) = CURRENCIES[idx];
                Self { code, exponent }
            })
            .map_err(|_| MoneyError::UnknownCurrency(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Number of decimal places in the minor unit.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    fn minor_per_unit(&self) -> i64 {
        10_i64.pow(self.exponent)
    }

    fn nanos_per_minor(&self) -> i64 {
        NANOS_PER_UNIT / self.minor_per_unit()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    currency: Currency,
    minor_units: i64,
}

impl Amount {
    pub fn new(currency: Currency, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(currency, 0)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency,
                actual: other.currency,
            });
        }
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(self.currency, minor_units))
    }

    /// Converts a wire `Money` into minor units.
    ///
    /// Rejects values the currency cannot represent exactly, e.g. `0.001 USD`.
    pub fn from_money(money: &Money) -> Result<Self, MoneyError> {
        let currency = Currency::parse(&money.currency_code)?;
        let nanos = i64::from(money.nanos);

        if nanos.abs() >= NANOS_PER_UNIT {
            return Err(MoneyError::InvalidMoney("nanos out of range"));
        }
        if (money.units > 0 && nanos < 0) || (money.units < 0 && nanos > 0) {
            return Err(MoneyError::InvalidMoney("units and nanos have opposite signs"));
        }
        if nanos % currency.nanos_per_minor() != 0 {
            return Err(MoneyError::Precision(currency));
        }

        let minor_units = money
            .units
            .checked_mul(currency.minor_per_unit())
            .and_then(|units| units.checked_add(nanos / currency.nanos_per_minor()))
            .ok_or(MoneyError::Overflow)?;

        Ok(Self::new(currency, minor_units))
    }

    pub fn to_money(&self) -> Money {
        let per_unit = self.currency.minor_per_unit();
        // Truncating division keeps units and nanos on the same side of zero.
        let remainder = self.minor_units % per_unit;
        Money {
            currency_code: self.currency.code.to_string(),
            units: self.minor_units / per_unit,
            nanos: (remainder * self.currency.nanos_per_minor()) as i32,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exponent = self.currency.exponent as usize;
        if exponent == 0 {
            return write!(f, "{} {}", self.minor_units, self.currency);
        }

        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        let per_unit = self.currency.minor_per_unit() as u64;
        write!(
            f,
            "{sign}{}.{:0exponent$} {}",
            abs / per_unit,
            abs % per_unit,
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::parse("USD").unwrap()
    }

    fn money(code: &str, units: i64, nanos: i32) -> Money {
        Money {
            currency_code: code.to_string(),
            units,
            nanos,
        }
    }

    #[test]
    fn parse_known_and_unknown_codes() {
        assert_eq!(usd().exponent(), 2);
        assert_eq!(Currency::parse("JPY").unwrap().exponent(), 0);
        assert_eq!(Currency::parse("BHD").unwrap().exponent(), 3);
        assert_eq!(
            Currency::parse("usd"),
            Err(MoneyError::UnknownCurrency("usd".to_string()))
        );
        assert!(Currency::parse("").is_err());
        assert!(Currency::parse("XXX").is_err());
    }

    #[test]
    fn currency_table_is_sorted() {
        assert!(CURRENCIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn from_money_converts_to_minor_units() {
        let amount = Amount::from_money(&money("USD", 1, 0)).unwrap();
        assert_eq!(amount.minor_units(), 100);

        let amount = Amount::from_money(&money("USD", -1, -750_000_000)).unwrap();
        assert_eq!(amount.minor_units(), -175);

        let amount = Amount::from_money(&money("USD", 0, -10_000_000)).unwrap();
        assert_eq!(amount.minor_units(), -1);

        let amount = Amount::from_money(&money("JPY", 500, 0)).unwrap();
        assert_eq!(amount.minor_units(), 500);
    }

    #[test]
    fn from_money_rejects_malformed_values() {
        assert_eq!(
            Amount::from_money(&money("USD", 1, -1)),
            Err(MoneyError::InvalidMoney("units and nanos have opposite signs"))
        );
        assert_eq!(
            Amount::from_money(&money("USD", 0, 1_000_000_000)),
            Err(MoneyError::InvalidMoney("nanos out of range"))
        );
        assert_eq!(
            Amount::from_money(&money("USD", 0, 1_000_000)),
            Err(MoneyError::Precision(usd()))
        );
        assert_eq!(
            Amount::from_money(&money("USD", i64::MAX, 0)),
            Err(MoneyError::Overflow)
        );
    }

    #[test]
    fn to_money_splits_units_and_nanos() {
        let m = Amount::new(usd(), -150).to_money();
        assert_eq!((m.units, m.nanos), (-1, -500_000_000));
        assert_eq!(m.currency_code, "USD");

        let m = Amount::new(Currency::parse("BHD").unwrap(), 1_234).to_money();
        assert_eq!((m.units, m.nanos), (1, 234_000_000));
    }

    #[test]
    fn checked_add_requires_same_currency() {
        let eur = Currency::parse("EUR").unwrap();
        let err = Amount::new(usd(), 1).checked_add(&Amount::new(eur, 1));
        assert_eq!(
            err,
            Err(MoneyError::CurrencyMismatch {
                expected: usd(),
                actual: eur
            })
        );

        let sum = Amount::new(usd(), 100).checked_add(&Amount::new(usd(), 50));
        assert_eq!(sum, Ok(Amount::new(usd(), 150)));

        let overflow = Amount::new(usd(), i64::MAX).checked_add(&Amount::new(usd(), 1));
        assert_eq!(overflow, Err(MoneyError::Overflow));
    }

    #[test]
    fn display_uses_currency_scale() {
        assert_eq!(Amount::new(usd(), 100).to_string(), "1.00 USD");
        assert_eq!(Amount::new(usd(), -50).to_string(), "-0.50 USD");
        assert_eq!(
            Amount::new(Currency::parse("JPY").unwrap(), 100).to_string(),
            "100 JPY"
        );
        assert_eq!(
            Amount::new(Currency::parse("KWD").unwrap(), 5).to_string(),
            "0.005 KWD"
        );
    }
}
