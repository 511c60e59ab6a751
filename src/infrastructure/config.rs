//! Server configuration loaded from the environment.
//!
//! Store selection lives in [`super::factory::RepositoryConfig`]; this module
//! covers the HTTP listener, log output and the listing cache.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = AppConfig::from_env()?;
//! let address = config.socket_address();
//! ```

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Default listening host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default number of cached listing pages.
pub const DEFAULT_LISTING_CACHE_CAPACITY: usize = 64;

/// Configuration error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected 'pretty' or 'json', got '{value}'")),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP server host address.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
    /// Listing pages kept in the LRU cache. `0` disables caching.
    pub listing_cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            listing_cache_capacity: DEFAULT_LISTING_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HOST`: Server host (optional, default: "0.0.0.0")
    /// - `PORT`: Server port (optional, default: 3000)
    /// - `LOG_FORMAT`: `pretty` | `json` (optional, default: `pretty`)
    /// - `LISTING_CACHE_CAPACITY`: cached listing pages (optional, default: 64)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable has an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_optional(&lookup, "PORT", defaults.port)?,
            log_format: parse_optional(&lookup, "LOG_FORMAT", defaults.log_format)?,
            listing_cache_capacity: parse_optional(
                &lookup,
                "LISTING_CACHE_CAPACITY",
                defaults.listing_cache_capacity,
            )?,
        })
    }

    /// Returns `host:port` for binding the listener.
    #[must_use]
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses an optional variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the variable is set but cannot be parsed.
fn parse_optional<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|error: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: error.to_string(),
            })
    })
}
