// src/domain/mod.rs

pub mod account;
pub mod trxn;

pub use account::Account;
pub use trxn::{NewTrxn, Trxn};

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._:-]{1,128}$").expect("identifier pattern is valid")
});

/// Client-supplied ids (account ids, operation ids) are opaque but restricted
/// to a conservative character set so they are safe in logs and URLs.
pub fn is_valid_identifier(id: &str) -> bool {
    IDENTIFIER.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("account-id"));
        assert!(is_valid_identifier("op:2020.01_01"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier("semi;colon"));
        assert!(!is_valid_identifier(&"x".repeat(129)));
        assert!(is_valid_identifier(&"x".repeat(128)));
    }
}
