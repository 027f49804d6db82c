//! Cache Store Module
//!
//! Main cache engine combining insertion-ordered storage with size
//! accounting, TTL expiration and LRU eviction.

use std::hash::Hash;
use std::iter::FusedIterator;

use indexmap::{map, Equivalent, IndexMap};
use tracing::{debug, trace};

use crate::cache::eviction::select_victim;
use crate::cache::{CacheEntry, CacheOptions, Clock, EntryMeta, SystemClock, Timestamp};

// == Cache ==
/// A map-like cache bounded by entry count, aggregate size and TTL.
///
/// Expiry is a read-time rule: an expired entry is hidden from `get`, `peek`
/// and `has` but keeps its slot, count and size until `evict`, `purge`,
/// `delete` or `clear` removes it. Bounds are checked after each `set`, which
/// evicts at most one entry per call.
///
/// Iteration follows insertion order and includes expired entries.
#[derive(Debug)]
pub struct Cache<K, V, C = SystemClock> {
    /// Values and their metadata, in insertion order
    entries: IndexMap<K, CacheEntry<V>>,
    /// Sum of every entry's size, wide enough that no mix of `u64` sizes
    /// can overflow it
    total_size: u128,
    options: CacheOptions<K, V>,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Hash + Eq,
{
    // == Constructor ==
    /// Creates an empty cache driven by the system clock.
    pub fn new(options: CacheOptions<K, V>) -> Self {
        Self::with_clock(options, SystemClock)
    }

    /// Creates a cache preloaded with `entries`, driven by the system clock.
    ///
    /// See [`Cache::from_entries_with_clock`] for how loading stops at a bound.
    pub fn from_entries<I>(entries: I, options: CacheOptions<K, V>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_entries_with_clock(entries, options, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Hash + Eq,
    C: Clock,
{
    /// Creates an empty cache that reads time from `clock`.
    pub fn with_clock(options: CacheOptions<K, V>, clock: C) -> Self {
        Self {
            entries: IndexMap::new(),
            total_size: 0,
            options,
            clock,
        }
    }

    /// Creates a cache preloaded with `entries`, reading time from `clock`.
    ///
    /// Entries are written in order until the entry count reaches
    /// `max_count` or the total size reaches `max_size`; the rest are
    /// dropped. Loading never evicts and never calls `on_evict`.
    pub fn from_entries_with_clock<I>(entries: I, options: CacheOptions<K, V>, clock: C) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::with_clock(options, clock);
        let mut entries = entries.into_iter();

        while let Some((key, value)) = entries.next() {
            if cache.options.bound_reached(cache.entries.len(), cache.total_size) {
                let dropped = 1 + entries.count();
                debug!(
                    loaded = cache.entries.len(),
                    dropped,
                    total_size = cache.total_size,
                    "Initial entries truncated at cache bound"
                );
                break;
            }
            let now = cache.clock.now();
            cache.write(key, value, now);
        }

        cache
    }

    // == Set ==
    /// Stores a value, returning the cache for chaining.
    ///
    /// Overwriting a key keeps its position, recomputes its size, and
    /// restarts its TTL and recency from now. It is not a removal, so
    /// `on_evict` is not called. If the write pushes the cache over
    /// `max_count` or `max_size`, exactly one entry is evicted.
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        let now = self.clock.now();
        self.write(key, value, now);

        let count = self.entries.len();
        if self.options.count_exceeded(count) || self.options.size_exceeded(self.total_size) {
            trace!(count, total_size = self.total_size, "Cache bound exceeded");
            self.evict();
        }

        self
    }

    // == Get ==
    /// Retrieves a live value and marks it as recently used.
    ///
    /// Returns None if the key is missing or expired. An expired entry is
    /// left in place and its recency is not touched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let now = self.clock.now();
        let entry = self.entries.get_mut(key)?;

        if entry.meta.is_expired_at(now) {
            return None;
        }

        entry.meta.last_used_at = entry.meta.last_used_at.max(now);
        Some(&entry.value)
    }

    // == Peek ==
    /// Retrieves a live value without changing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.meta.is_expired_at(now))
            .map(|entry| &entry.value)
    }

    // == Has ==
    /// Checks whether a key holds a value that has not yet expired.
    ///
    /// This check is stricter than `get`: an entry expiring exactly now is
    /// reported absent. Never changes recency.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| entry.meta.is_live_at(now))
    }

    // == Contains Key ==
    /// Checks whether a key occupies a slot, expired or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry, notifying `on_evict` first.
    ///
    /// Returns false without side effects if the key has no slot. Expired
    /// entries are removed like any other.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        match self.entries.get_index_of(key) {
            Some(index) => self.remove_index(index).is_some(),
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry.
    ///
    /// `on_evict` sees each entry in insertion order, expired ones included,
    /// before anything is removed.
    pub fn clear(&mut self) {
        if let Some(on_evict) = self.options.on_evict.as_mut() {
            for (key, entry) in &self.entries {
                on_evict(key, &entry.value);
            }
        }

        self.entries.clear();
        self.total_size = 0;
    }

    // == Evict ==
    /// Removes one entry: the first expired entry in insertion order, or
    /// failing that the least recently used one.
    ///
    /// Returns the removed pair, or None if the cache is empty.
    pub fn evict(&mut self) -> Option<(K, V)> {
        let now = self.clock.now();
        let index = select_victim(&self.entries, now)?;
        let evicted = self.remove_index(index);

        debug!(
            index,
            remaining = self.entries.len(),
            total_size = self.total_size,
            "Evicted cache entry"
        );
        evicted
    }

    // == Purge ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<usize> = self
            .entries
            .values()
            .enumerate()
            .filter(|(_, entry)| entry.meta.is_expired_at(now))
            .map(|(index, _)| index)
            .collect();

        // Each removal shifts the following slots down by one.
        for (removed, index) in expired.iter().enumerate() {
            self.remove_index(index - removed);
        }

        let count = expired.len();
        if count > 0 {
            debug!(
                removed = count,
                remaining = self.entries.len(),
                "Purged expired cache entries"
            );
        }
        count
    }

    /// Returns the metadata of a stored entry, expired or not.
    pub fn meta<Q>(&self, key: &Q) -> Option<&EntryMeta>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get(key).map(|entry| &entry.meta)
    }

    // == Options ==
    pub fn options(&self) -> &CacheOptions<K, V> {
        &self.options
    }

    /// Mutable access to the live configuration.
    ///
    /// Tightened bounds are not enforced until the next `set`.
    pub fn options_mut(&mut self) -> &mut CacheOptions<K, V> {
        &mut self.options
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Writes a slot and keeps `total_size` in step, without bound checks.
    fn write(&mut self, key: K, value: V, now: Timestamp) {
        let size = self.options.size_of(&key, &value);
        let meta = EntryMeta::new(size, self.options.ttl, now);

        if let Some(previous) = self.entries.insert(key, CacheEntry::new(value, meta)) {
            self.total_size -= u128::from(previous.meta.size);
        }
        self.total_size += u128::from(size);
    }

    /// Removal path shared by delete, evict and purge.
    fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        let (key, entry) = self.entries.get_index(index)?;
        if let Some(on_evict) = self.options.on_evict.as_mut() {
            on_evict(key, &entry.value);
        }

        let (key, entry) = self.entries.shift_remove_index(index)?;
        self.total_size -= u128::from(entry.meta.size);
        Some((key, entry.value))
    }
}

impl<K, V, C> Cache<K, V, C> {
    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Total Size ==
    /// Returns the sum of all stored entries' sizes, expired ones included.
    pub fn total_size(&self) -> u128 {
        self.total_size
    }

    // == Iteration ==
    /// Iterates over all stored pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values().map(|entry| &entry.value)
    }
}

impl<K, V> Default for Cache<K, V, SystemClock>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<K, V> FromIterator<(K, V)> for Cache<K, V, SystemClock>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter, CacheOptions::default())
    }
}

impl<K, V, C> Extend<(K, V)> for Cache<K, V, C>
where
    K: Hash + Eq,
    C: Clock,
{
    /// Stores each pair through `set`, so bounds are enforced per pair.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a Cache<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Iterator ==
/// Insertion-order iterator over a cache's pairs.
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    inner: map::Iter<'a, K, CacheEntry<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, entry)| (key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, entry)| (key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
