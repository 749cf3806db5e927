//! Database configuration loaded from the environment.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `DATABASE_URL` | yes | none |
//! | `TASKS_DB_MAX_CONNECTIONS` | no | `10` |
//! | `TASKS_DB_IDLE_TIMEOUT_MS` | no | `30000` |
//! | `TASKS_DB_CONNECT_TIMEOUT_MS` | no | `5000` |

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment key for the connection string.
pub const DATABASE_URL_KEY: &str = "DATABASE_URL";
/// Environment key for the pool size.
pub const MAX_CONNECTIONS_KEY: &str = "TASKS_DB_MAX_CONNECTIONS";
/// Environment key for the idle connection timeout in milliseconds.
pub const IDLE_TIMEOUT_KEY: &str = "TASKS_DB_IDLE_TIMEOUT_MS";
/// Environment key for the connection acquisition timeout in milliseconds.
pub const CONNECT_TIMEOUT_KEY: &str = "TASKS_DB_CONNECT_TIMEOUT_MS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing environment variable: {0}")]
    Missing(String),

    /// A variable is set but cannot be used.
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// Offending variable name.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Connection settings for the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    database_url: String,
    max_connections: u32,
    idle_timeout: Duration,
    connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a configuration with default pool settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset and
    /// [`ConfigError::Invalid`] when an optional value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is absent or
    /// blank and [`ConfigError::Invalid`] when an optional value does not
    /// parse or is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_KEY)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing(DATABASE_URL_KEY.to_owned()))?;

        let max_connections =
            parse_positive(&lookup, MAX_CONNECTIONS_KEY, DEFAULT_MAX_CONNECTIONS)?;
        let idle_timeout_ms = parse_positive(&lookup, IDLE_TIMEOUT_KEY, DEFAULT_IDLE_TIMEOUT_MS)?;
        let connect_timeout_ms =
            parse_positive(&lookup, CONNECT_TIMEOUT_KEY, DEFAULT_CONNECT_TIMEOUT_MS)?;

        Ok(Self {
            database_url,
            max_connections,
            idle_timeout: Duration::from_millis(idle_timeout_ms),
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        })
    }

    /// Overrides the maximum pool size. Zero is raised to one.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Returns the connection string.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum pool size.
    #[must_use]
    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    /// Returns how long an idle connection is kept.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns how long to wait when acquiring a connection.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
        key: key.to_owned(),
        message: err.to_string(),
    })?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key: key.to_owned(),
            message: "must be greater than zero".to_owned(),
        });
    }
    Ok(value)
}
