// src/config.rs

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug)]
pub struct LedgerConfig {
    // Network
    pub grpc_addr: SocketAddr,
    pub http_addr: SocketAddr,

    // Persistence. The URL may embed credentials, so it is kept out of Debug.
    pub database_url: SecretString,
    pub db_max_connections: u32,

    // Posting
    pub max_post_attempts: u32,

    pub log_format: LogFormat,
}

impl LedgerConfig {
    /// Reads the configuration from `LEDGER_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// defaults for absent keys. Present but unparsable values are errors;
    /// a typo must not silently start the service on a default port.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            grpc_addr: parse(&lookup, "LEDGER_GRPC_ADDR", "socket address", "0.0.0.0:9090")?,
            http_addr: parse(&lookup, "LEDGER_HTTP_ADDR", "socket address", "0.0.0.0:8080")?,
            database_url: SecretString::new(
                lookup("LEDGER_DATABASE_URL").unwrap_or_else(|| "sqlite://ledger.db".to_string()),
            ),
            db_max_connections: parse(&lookup, "LEDGER_DB_MAX_CONNECTIONS", "positive integer", "5")
                .and_then(|n: u32| positive("LEDGER_DB_MAX_CONNECTIONS", n))?,
            max_post_attempts: parse(&lookup, "LEDGER_MAX_POST_ATTEMPTS", "positive integer", "5")
                .and_then(|n: u32| positive("LEDGER_MAX_POST_ATTEMPTS", n))?,
            log_format: match lookup("LEDGER_LOG_FORMAT").as_deref() {
                None | Some("pretty") => LogFormat::Pretty,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        var: "LEDGER_LOG_FORMAT",
                        expected: "log format (pretty|json)",
                        value: other.to_string(),
                    });
                }
            },
        })
    }

    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

fn parse<F, T>(lookup: &F, var: &'static str, expected: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}

fn positive(var: &'static str, n: u32) -> Result<u32, ConfigError> {
    if n == 0 {
        return Err(ConfigError::Invalid {
            var,
            expected: "positive integer",
            value: n.to_string(),
        });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<LedgerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LedgerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.grpc_addr, "0.0.0.0:9090".parse().unwrap());
        assert_eq!(cfg.http_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url(), "sqlite://ledger.db");
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.max_post_attempts, 5);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("LEDGER_GRPC_ADDR", "127.0.0.1:50051"),
            ("LEDGER_DATABASE_URL", "sqlite:///var/lib/ledger/ledger.db"),
            ("LEDGER_MAX_POST_ATTEMPTS", "9"),
            ("LEDGER_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.grpc_addr.port(), 50051);
        assert_eq!(cfg.database_url(), "sqlite:///var/lib/ledger/ledger.db");
        assert_eq!(cfg.max_post_attempts, 9);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = config(&[("LEDGER_GRPC_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LEDGER_GRPC_ADDR", .. }));

        let err = config(&[("LEDGER_MAX_POST_ATTEMPTS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LEDGER_MAX_POST_ATTEMPTS", .. }));

        let err = config(&[("LEDGER_LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "LEDGER_LOG_FORMAT", .. }));
    }

    #[test]
    fn debug_output_hides_database_url() {
        let cfg = config(&[("LEDGER_DATABASE_URL", "postgres://user:hunter2@db/ledger")]).unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
