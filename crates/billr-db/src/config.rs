//! Runtime configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                        | Default                  |
//! |---------------------------------|--------------------------|
//! | `BILLR_DATABASE_PATH`           | `./cloudbillr.db`        |
//! | `BILLR_DB_MAX_CONNECTIONS`      | `5`                      |
//! | `BILLR_DB_MIN_CONNECTIONS`      | `1` (at most the max)    |
//! | `BILLR_DB_ACQUIRE_TIMEOUT_SECS` | `30`                     |
//! | `BILLR_BASE_URL`                | `http://localhost:3000`  |
//! | `BILLR_LOG`                     | `info`                   |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

/// CloudBillr configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillrConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// Seconds a query waits for a pooled connection.
    pub acquire_timeout_secs: u64,

    /// Public origin of the web app; the invoice logo is served from here.
    pub base_url: String,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BillrConfig {
    fn default() -> Self {
        BillrConfig {
            database_path: PathBuf::from("./cloudbillr.db"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
            base_url: "http://localhost:3000".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl BillrConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BillrConfig::default();

        let max_connections = parse_var(&lookup, "BILLR_DB_MAX_CONNECTIONS", |n: &u32| *n > 0)?
            .unwrap_or(defaults.max_connections);
        let min_connections = parse_var(&lookup, "BILLR_DB_MIN_CONNECTIONS", |n: &u32| {
            *n <= max_connections
        })?
        .unwrap_or_else(|| defaults.min_connections.min(max_connections));
        let acquire_timeout_secs =
            parse_var(&lookup, "BILLR_DB_ACQUIRE_TIMEOUT_SECS", |secs: &u64| *secs > 0)?
                .unwrap_or(defaults.acquire_timeout_secs);

        let base_url = lookup("BILLR_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue("BILLR_BASE_URL".to_string()));
        }

        let database_path = match lookup("BILLR_DATABASE_PATH") {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::MissingRequired("BILLR_DATABASE_PATH".to_string()))
            }
            Some(path) => PathBuf::from(path.trim()),
            None => defaults.database_path,
        };

        Ok(BillrConfig {
            database_path,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            base_url,
            log_filter: lookup("BILLR_LOG").unwrap_or(defaults.log_filter),
        })
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .pool_size(self.min_connections, self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

/// Parses `key` when set. A value that fails to parse or to pass `valid` is
/// a [`ConfigError::InvalidValue`].
fn parse_var<T, F>(
    lookup: &F,
    key: &str,
    valid: impl Fn(&T) -> bool,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .ok()
                .filter(|value| valid(value))
                .ok_or_else(|| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BillrConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BillrConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, BillrConfig::default());
        let db_config = config.db_config();
        assert_eq!(db_config.max_connections, 5);
        assert_eq!(db_config.min_connections, 1);
        assert_eq!(db_config.acquire_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BILLR_DATABASE_PATH", "/var/lib/billr/data.db"),
            ("BILLR_DB_MAX_CONNECTIONS", "12"),
            ("BILLR_DB_MIN_CONNECTIONS", "4"),
            ("BILLR_DB_ACQUIRE_TIMEOUT_SECS", " 8 "),
            ("BILLR_BASE_URL", "https://billr.example.in/"),
            ("BILLR_LOG", "billr_db=debug"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/billr/data.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.min_connections, 4);
        assert_eq!(config.acquire_timeout_secs, 8);
        assert_eq!(config.base_url, "https://billr.example.in");
        assert_eq!(config.log_filter, "billr_db=debug");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("BILLR_DB_MAX_CONNECTIONS", "lots")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("BILLR_DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("BILLR_DB_ACQUIRE_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("BILLR_BASE_URL", "localhost:3000")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("BILLR_DATABASE_PATH", " ")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_min_connections_bounded_by_max() {
        let config = load(&[
            ("BILLR_DB_MAX_CONNECTIONS", "2"),
            ("BILLR_DB_MIN_CONNECTIONS", "2"),
        ])
        .unwrap();
        assert_eq!(config.db_config().min_connections, 2);

        let err = load(&[
            ("BILLR_DB_MAX_CONNECTIONS", "2"),
            ("BILLR_DB_MIN_CONNECTIONS", "3"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "BILLR_DB_MIN_CONNECTIONS"));

        assert!(matches!(
            load(&[("BILLR_DB_MIN_CONNECTIONS", "-1")]),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
