//! Cache Entry Module
//!
//! Defines the slot stored per key: the value plus its size, expiry and
//! recency metadata.

use std::time::Duration;

use crate::cache::Timestamp;

// == Entry Metadata ==
/// Bookkeeping kept alongside every stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    /// Size charged against the cache's `max_size`
    pub size: u64,
    /// Expiration timestamp (Unix milliseconds), None = never expires
    pub expires_at: Option<Timestamp>,
    /// Last write or successful read (Unix milliseconds)
    pub last_used_at: Timestamp,
}

impl EntryMeta {
    // == Constructor ==
    /// Creates metadata for a write happening at `now`.
    ///
    /// A missing or zero TTL means the entry never expires.
    pub fn new(size: u64, ttl: Option<Duration>, now: Timestamp) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| now.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)));

        Self {
            size,
            expires_at,
            last_used_at: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is past its expiry.
    ///
    /// Boundary condition: an entry expiring exactly at `now` is not yet
    /// expired. This is the check used by `get`, `evict` and `purge`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(expires) if expires < now)
    }

    // == Is Live ==
    /// Checks whether the entry is strictly before its expiry.
    ///
    /// Boundary condition: an entry expiring exactly at `now` is not live.
    /// This is the stricter check used by `has`.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(expires) => expires > now,
            None => true,
        }
    }
}

// == Cache Entry ==
/// A stored value together with its metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Size, expiry and recency
    pub meta: EntryMeta,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, meta: EntryMeta) -> Self {
        Self { value, meta }
    }
}
