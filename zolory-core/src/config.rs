// src/config.rs

use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/zolory.db";

/// Runtime settings for the ledger, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout: Duration,
    /// Coins credited by a daily claim when the caller has no server-specific amount.
    pub daily_reward: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            daily_reward: 100,
        }
    }
}

impl LedgerConfig {
    /// Loads `.env` if present, then reads `DATABASE_URL`,
    /// `DATABASE_MAX_CONNECTIONS`, `DATABASE_BUSY_TIMEOUT_SECS` and `DAILY_REWARD`.
    pub fn from_env() -> Result<Self, Error> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            busy_timeout: parse_var::<u64, _>(&lookup, "DATABASE_BUSY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.busy_timeout),
            daily_reward: parse_var(&lookup, "DAILY_REWARD")?.unwrap_or(defaults.daily_reward),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}='{raw}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = LedgerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, LedgerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = LedgerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_BUSY_TIMEOUT_SECS", " 2 "),
            ("DAILY_REWARD", "250"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 12);
        assert_eq!(cfg.busy_timeout, Duration::from_secs(2));
        assert_eq!(cfg.daily_reward, 250);
    }

    #[test]
    fn test_malformed_number_is_config_error() {
        let err = LedgerConfig::from_lookup(lookup_from(&[("DAILY_REWARD", "lots")])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("DAILY_REWARD")));
    }
}
