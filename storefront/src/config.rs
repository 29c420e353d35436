//! Configuration for the storefront.
//!
//! Loads configuration from environment variables (and a `.env` file, if one
//! exists) with defaults for everything. Binaries that install logging after
//! reading configuration call [`load_dotenv`] and [`Config::from_process_env`]
//! themselves so a broken `.env` can be reported once logging is up.

use crate::filter::PriceRange;
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Malformed configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// The default price range is reversed
    #[error("FILTER_PRICE_MIN ({min}) is above FILTER_PRICE_MAX ({max})")]
    InvertedPriceRange {
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Checkout settings
    pub checkout: CheckoutConfig,
    /// Browse view settings
    pub browse: BrowseConfig,
    /// Store runtime settings
    pub runtime: RuntimeConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Checkout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Simulated payment processing time in milliseconds (default: 1500)
    pub processing_delay_ms: u64,
}

/// Browse view settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Lower bound of the initial price filter in RWF (default: 0)
    pub price_min: u64,
    /// Upper bound of the initial price filter in RWF (default: 200000)
    pub price_max: u64,
    /// Featured events on the home page (default: 3)
    pub featured_limit: usize,
}

/// Store runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Capacity of the action broadcast channel (default: 16)
    pub broadcast_capacity: usize,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG`, default: info)
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checkout: CheckoutConfig {
                processing_delay_ms: 1500,
            },
            browse: BrowseConfig {
                price_min: 0,
                price_max: PriceRange::DEFAULT_MAX,
                featured_limit: 3,
            },
            runtime: RuntimeConfig {
                broadcast_capacity: 16,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults for anything missing or malformed
    #[must_use]
    pub fn from_env() -> Self {
        warn_on_dotenv_error();
        Self::from_process_env()
    }

    /// Lenient load from the process environment only, without reading `.env`
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::from_lookup_lenient(|key| env::var(key).ok())
    }

    /// Load configuration, rejecting malformed values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but cannot be parsed, or
    /// if the price bounds are reversed.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        warn_on_dotenv_error();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Strict load from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`Config::try_from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            checkout: CheckoutConfig {
                processing_delay_ms: parse(
                    &lookup,
                    "CHECKOUT_PROCESSING_DELAY_MS",
                    defaults.checkout.processing_delay_ms,
                )?,
            },
            browse: BrowseConfig {
                price_min: parse(&lookup, "FILTER_PRICE_MIN", defaults.browse.price_min)?,
                price_max: parse(&lookup, "FILTER_PRICE_MAX", defaults.browse.price_max)?,
                featured_limit: parse(&lookup, "FEATURED_LIMIT", defaults.browse.featured_limit)?,
            },
            runtime: RuntimeConfig {
                broadcast_capacity: parse(
                    &lookup,
                    "STORE_BROADCAST_CAPACITY",
                    defaults.runtime.broadcast_capacity,
                )?,
            },
            logging: LoggingConfig {
                level: lookup("RUST_LOG").unwrap_or(defaults.logging.level),
            },
        };

        if config.browse.price_min > config.browse.price_max {
            return Err(ConfigError::InvertedPriceRange {
                min: config.browse.price_min,
                max: config.browse.price_max,
            });
        }
        Ok(config)
    }

    fn from_lookup_lenient<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            checkout: CheckoutConfig {
                processing_delay_ms: lookup("CHECKOUT_PROCESSING_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.checkout.processing_delay_ms),
            },
            browse: BrowseConfig {
                price_min: lookup("FILTER_PRICE_MIN")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.browse.price_min),
                price_max: lookup("FILTER_PRICE_MAX")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.browse.price_max),
                featured_limit: lookup("FEATURED_LIMIT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.browse.featured_limit),
            },
            runtime: RuntimeConfig {
                broadcast_capacity: lookup("STORE_BROADCAST_CAPACITY")
                    .and_then(|s| s.parse::<usize>().ok())
                    .filter(|capacity| *capacity > 0)
                    .unwrap_or(defaults.runtime.broadcast_capacity),
            },
            logging: LoggingConfig {
                level: lookup("RUST_LOG").unwrap_or(defaults.logging.level),
            },
        }
    }

    /// Simulated payment processing time
    #[must_use]
    pub const fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.checkout.processing_delay_ms)
    }

    /// Initial price filter
    #[must_use]
    pub fn price_range(&self) -> PriceRange {
        PriceRange::new(
            Money::rwf(self.browse.price_min),
            Money::rwf(self.browse.price_max),
        )
    }
}

/// Loads `.env` into the process environment; a missing file is not an error
///
/// # Errors
///
/// Returns the [`dotenvy::Error`] of a `.env` file that exists but cannot be
/// read or parsed.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    dotenv_outcome(dotenvy::dotenv().map(|_| ()))
}

fn dotenv_outcome(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(error) if error.not_found() => Ok(()),
        other => other,
    }
}

fn warn_on_dotenv_error() {
    if let Err(error) = load_dotenv() {
        tracing::warn!(%error, "Ignoring unreadable .env file");
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
            value,
        }),
    }
}
