//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use crate::error::{Error, Result};

/// Environment variable holding the cache capacity.
pub const CAPACITY_VAR: &str = "LRU_CAPACITY";

/// Capacity used when `LRU_CAPACITY` is unset.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 1000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a Config reading variables through `lookup`.
    ///
    /// Unset variables fall back to defaults. Set but unparseable values,
    /// including negative capacities, are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = match lookup(CAPACITY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::InvalidConfig {
                    var: CAPACITY_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_CAPACITY,
        };

        Ok(Self { capacity })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
