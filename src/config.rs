//! Configuration Module
//!
//! Loads cache bounds from environment variables or a serialized config.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Environment variable holding the maximum entry count
pub const ENV_MAX_COUNT: &str = "CACHE_MAX_COUNT";
/// Environment variable holding the maximum aggregate size
pub const ENV_MAX_SIZE: &str = "CACHE_MAX_SIZE";
/// Environment variable holding the TTL in milliseconds
pub const ENV_TTL_MS: &str = "CACHE_TTL_MS";

/// Cache bounds that can be loaded from outside the program.
///
/// Every field is optional; a missing value means unbounded. Callbacks
/// cannot be expressed here and are attached through
/// [`CacheOptions`](crate::CacheOptions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheLimits {
    /// Maximum number of entries
    pub max_count: Option<usize>,
    /// Maximum aggregate size
    pub max_size: Option<u64>,
    /// Entry lifetime in milliseconds
    pub ttl_ms: Option<u64>,
}

impl CacheLimits {
    /// Loads limits from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_COUNT` - Maximum entry count (default: unbounded)
    /// - `CACHE_MAX_SIZE` - Maximum aggregate size (default: unbounded)
    /// - `CACHE_TTL_MS` - Entry lifetime in milliseconds (default: no expiry)
    ///
    /// Unset or empty variables mean unbounded. A value that does not parse
    /// is an error rather than a silent default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads limits through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let limits = Self {
            max_count: parse_var(&lookup, ENV_MAX_COUNT)?,
            max_size: parse_var(&lookup, ENV_MAX_SIZE)?,
            ttl_ms: parse_var(&lookup, ENV_TTL_MS)?,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Rejects zero bounds, which would evict every entry on write.
    pub fn validate(&self) -> Result<()> {
        if self.max_count == Some(0) {
            return Err(CacheError::InvalidConfig(
                "max_count must be greater than zero".to_string(),
            ));
        }
        if self.max_size == Some(0) {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the TTL as a duration, if one is set.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CacheError::InvalidConfig(format!("{}={:?}: {}", name, raw, e))),
        _ => Ok(None),
    }
}
