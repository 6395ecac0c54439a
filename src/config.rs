// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound on pooled connections
    pub database_max_connections: u32,
    /// How long a request waits for a pooled connection
    pub database_acquire_timeout: Duration,
    /// Fixed seed for reward draws. `None` seeds every request from OS entropy.
    pub reward_seed: Option<u64>,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            database_url: "postgres://localhost/workout_cards_test".to_string(),
            port: 8080,
            database_max_connections: 5,
            database_acquire_timeout: Duration::from_secs(5),
            reward_seed: Some(42),
            run_migrations: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            port: parse_var("PORT")?.unwrap_or(8080),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            database_acquire_timeout: Duration::from_secs(
                parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS")?.unwrap_or(5),
            ),
            reward_seed: parse_var("REWARD_SEED")?,
            run_migrations: parse_var("RUN_MIGRATIONS")?.unwrap_or(true),
        })
    }
}

/// Read an optional variable, failing only if it is set but unparsable.
fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key, raw)),
        _ => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything touching them lives in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://user:pw@db/cards");
        env::remove_var("PORT");
        env::remove_var("REWARD_SEED");
        env::set_var("DATABASE_MAX_CONNECTIONS", "3");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "postgres://user:pw@db/cards");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 3);
        assert_eq!(config.reward_seed, None);
        assert!(config.run_migrations);

        env::set_var("REWARD_SEED", "7");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.reward_seed, Some(7));

        env::set_var("PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("PORT", _)));

        env::remove_var("PORT");
        env::remove_var("REWARD_SEED");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
    }
}
