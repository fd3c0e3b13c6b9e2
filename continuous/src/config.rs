use crate::error::{Error, Result};
use crate::error;
use std::env;
use std::str::FromStr;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_DAILY_WINDOW_DAYS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub log_file: Option<String>,
    pub log_level: String,
    pub max_connections: u32,
    pub workers: usize,
    pub daily_window_days: u32,
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up a
    /// local `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| error!(ConfigError, "DATABASE_URL environment variable is not set."))?;

        Ok(Config {
            database_url,
            log_file: lookup("LOG_FILE").filter(|path| !path.is_empty()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            max_connections: parse_or(&lookup, "MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            workers: parse_or(&lookup, "WORKERS", DEFAULT_WORKERS)?,
            daily_window_days: parse_or(&lookup, "DAILY_WINDOW_DAYS", DEFAULT_DAILY_WINDOW_DAYS)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            error!(ConfigError, "{} is not a valid number: {}", key, raw)
        }),
        None => Ok(default),
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
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/db")]))
                .unwrap();

        // Validate
        assert_eq!(config.database_url, "postgres://localhost/db");
        assert_eq!(config.log_file, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.workers, 4);
        assert_eq!(config.daily_window_days, 15);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("LOG_FILE", "logs/continuous.log"),
            ("LOG_LEVEL", "debug"),
            ("WORKERS", "8"),
            ("DAILY_WINDOW_DAYS", " 30 "),
        ]))
        .unwrap();

        // Validate
        assert_eq!(config.log_file.as_deref(), Some("logs/continuous.log"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.workers, 8);
        assert_eq!(config.daily_window_days, 30);
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup_from(&[]));

        // Validate
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_invalid_number() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("WORKERS", "many"),
        ]));

        // Validate
        match result {
            Err(Error::ConfigError(msg)) => assert!(msg.contains("WORKERS")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }
}
