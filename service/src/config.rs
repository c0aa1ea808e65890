//! Runtime configuration.
//!
//! # Environment Variables
//!
//! - `STORE_MODE`: `in_memory` (default) | `postgres`
//! - `STORE_ADDRESS`: store connection URL (default: `postgres://localhost:5432`)
//! - `DATABASE_NAME`: database to use on the store (default: `todoDB`)
//! - `COLLECTION_NAME`: collection (table) holding todos (default: `todo`)
//! - `STORE_MAX_CONNECTIONS`: connection pool size (default: `10`)
//! - `LISTEN_HOST`: address to bind (default: `0.0.0.0`)
//! - `LISTEN_PORT`: port to bind (default: `9090`)
//! - `REQUEST_TIMEOUT_SECS`: timeout for each store call (default: `60`)
//! - `SHUTDOWN_GRACE_SECS`: how long in-flight requests may run after a
//!   shutdown signal (default: `5`)
//!
//! Empty or whitespace-only values are treated as unset.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::error::redact_credentials;

pub const DEFAULT_STORE_ADDRESS: &str = "postgres://localhost:5432";
pub const DEFAULT_DATABASE_NAME: &str = "todoDB";
pub const DEFAULT_COLLECTION_NAME: &str = "todo";
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 9090;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Which `TodoStore` backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Process-local storage. Nothing survives a restart.
    #[default]
    InMemory,
    /// `PostgreSQL` with one JSONB document per todo.
    Postgres,
}

impl FromStr for StoreMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStoreMode(value.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid store mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStoreMode(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("{name} is not valid unicode")]
    NotUnicode { name: &'static str },

    /// Collection names are spliced into SQL, so only plain identifiers pass.
    #[error("Invalid collection name: '{0}'. Use letters, digits and '_' (max 63 chars), not starting with a digit")]
    InvalidCollectionName(String),

    #[error("Invalid listen address: {0}")]
    InvalidListenAddress(String),
}

/// Everything the service needs to start.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub store_mode: StoreMode,
    pub store_address: String,
    pub database_name: String,
    pub collection_name: String,
    pub max_connections: u32,
    pub listen_host: String,
    pub listen_port: u16,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_mode: StoreMode::default(),
            store_address: DEFAULT_STORE_ADDRESS.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

// The store address may carry a password.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store_mode", &self.store_mode)
            .field("store_address", &redact_credentials(&self.store_address))
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .field("max_connections", &self.max_connections)
            .field("listen_host", &self.listen_host)
            .field("listen_port", &self.listen_port)
            .field("request_timeout", &self.request_timeout)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a variable is set to a value that does
    /// not parse or the result fails `validate`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&'static str) -> Result<String, env::VarError>,
    {
        let read = |name: &'static str| -> Result<Option<String>, ConfigurationError> {
            match lookup(name) {
                Ok(value) => {
                    let value = value.trim();
                    Ok((!value.is_empty()).then(|| value.to_string()))
                }
                Err(env::VarError::NotPresent) => Ok(None),
                Err(env::VarError::NotUnicode(_)) => Err(ConfigurationError::NotUnicode { name }),
            }
        };

        let defaults = Self::default();
        let config = Self {
            store_mode: read("STORE_MODE")?
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or(defaults.store_mode),
            store_address: read("STORE_ADDRESS")?.unwrap_or(defaults.store_address),
            database_name: read("DATABASE_NAME")?.unwrap_or(defaults.database_name),
            collection_name: read("COLLECTION_NAME")?.unwrap_or(defaults.collection_name),
            max_connections: parse_or("STORE_MAX_CONNECTIONS", read("STORE_MAX_CONNECTIONS")?, defaults.max_connections)?,
            listen_host: read("LISTEN_HOST")?.unwrap_or(defaults.listen_host),
            listen_port: parse_or("LISTEN_PORT", read("LISTEN_PORT")?, defaults.listen_port)?,
            request_timeout: parse_or("REQUEST_TIMEOUT_SECS", read("REQUEST_TIMEOUT_SECS")?, defaults.request_timeout.as_secs())
                .map(Duration::from_secs)?,
            shutdown_grace: parse_or("SHUTDOWN_GRACE_SECS", read("SHUTDOWN_GRACE_SECS")?, defaults.shutdown_grace.as_secs())
                .map(Duration::from_secs)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError` if the collection name is not a plain SQL
    /// identifier, the pool size or timeout is zero, or the listen address
    /// does not parse.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !is_plain_identifier(&self.collection_name) {
            return Err(ConfigurationError::InvalidCollectionName(
                self.collection_name.clone(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "STORE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigurationError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        self.listen_address()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidListenAddress` if host and port do
    /// not form a socket address.
    pub fn listen_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let raw = if self.listen_host.contains(':') {
            format!("[{}]:{}", self.listen_host, self.listen_port)
        } else {
            format!("{}:{}", self.listen_host, self.listen_port)
        };
        raw.parse()
            .map_err(|_| ConfigurationError::InvalidListenAddress(raw))
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigurationError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 63
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub const fn store_mode(mut self, mode: StoreMode) -> Self {
        self.config.store_mode = mode;
        self
    }

    #[must_use]
    pub fn store_address(mut self, address: impl Into<String>) -> Self {
        self.config.store_address = address.into();
        self
    }

    #[must_use]
    pub fn database_name(mut self, name: impl Into<String>) -> Self {
        self.config.database_name = name.into();
        self
    }

    #[must_use]
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    #[must_use]
    pub fn listen_host(mut self, host: impl Into<String>) -> Self {
        self.config.listen_host = host.into();
        self
    }

    #[must_use]
    pub const fn listen_port(mut self, port: u16) -> Self {
        self.config.listen_port = port;
        self
    }

    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<Config, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
