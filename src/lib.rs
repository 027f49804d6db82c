//! Bounded Cache - A map-like in-memory cache
//!
//! Bounds entries by count, aggregate size and TTL, evicting expired entries
//! first and least recently used entries otherwise.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    Cache, CacheEntry, CacheOptions, Clock, EntryMeta, ManualClock, SharedCache, SystemClock,
    Timestamp,
};
pub use config::CacheLimits;
pub use error::{CacheError, Result};
