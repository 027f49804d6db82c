//! Cache Options Module
//!
//! Bounds, TTL and callbacks that shape a cache's behaviour.

use std::fmt;
use std::time::Duration;

use crate::config::CacheLimits;

/// Computes the size an entry contributes towards `max_size`.
///
/// Any `u64` is accepted; the cache sums sizes in a `u128`.
pub type SizeFn<K, V> = Box<dyn Fn(&K, &V) -> u64 + Send + Sync>;

/// Notified with every entry right before it leaves the cache.
pub type EvictFn<K, V> = Box<dyn FnMut(&K, &V) + Send>;

// == Cache Options ==
/// Configuration for a [`Cache`](crate::Cache).
///
/// Every bound defaults to unbounded. Fields stay public so a running cache
/// can be retuned through `Cache::options_mut`; new bounds are only enforced
/// on the next `set`.
///
/// Callbacks are not guarded. A panic inside `size_fn` or `on_evict`
/// unwinds through the calling cache operation.
pub struct CacheOptions<K, V> {
    /// Maximum number of entries, None = unbounded
    pub max_count: Option<usize>,
    /// Maximum aggregate size, None = unbounded
    pub max_size: Option<u64>,
    /// Lifetime given to every write, None or zero = never expires
    pub ttl: Option<Duration>,
    /// Entry size function, None = every entry weighs 1
    pub size_fn: Option<SizeFn<K, V>>,
    /// Called for each removal: delete, clear, purge and eviction
    pub on_evict: Option<EvictFn<K, V>>,
}

impl<K, V> CacheOptions<K, V> {
    // == Constructor ==
    /// Creates options with no bounds and no callbacks.
    pub fn new() -> Self {
        Self {
            max_count: None,
            max_size: None,
            ttl: None,
            size_fn: None,
            on_evict: None,
        }
    }

    /// Creates options from loaded limits, without callbacks.
    pub fn from_limits(limits: &CacheLimits) -> Self {
        Self {
            max_count: limits.max_count,
            max_size: limits.max_size,
            ttl: limits.ttl(),
            ..Self::new()
        }
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_size_fn<F>(mut self, size_fn: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
    {
        self.size_fn = Some(Box::new(size_fn));
        self
    }

    pub fn with_on_evict<F>(mut self, on_evict: F) -> Self
    where
        F: FnMut(&K, &V) + Send + 'static,
    {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    // == Bound Checks ==
    /// Returns true if `count` entries exceed `max_count`.
    pub(crate) fn count_exceeded(&self, count: usize) -> bool {
        self.max_count.is_some_and(|max| count > max)
    }

    /// Returns true if `size` exceeds `max_size`.
    pub(crate) fn size_exceeded(&self, size: u128) -> bool {
        self.max_size.is_some_and(|max| size > u128::from(max))
    }

    /// Returns true once `count` or `size` has reached a bound. Bulk loading
    /// stops here instead of evicting.
    pub(crate) fn bound_reached(&self, count: usize, size: u128) -> bool {
        self.max_count.is_some_and(|max| count >= max)
            || self.max_size.is_some_and(|max| size >= u128::from(max))
    }

    pub(crate) fn size_of(&self, key: &K, value: &V) -> u64 {
        match &self.size_fn {
            Some(size_fn) => size_fn(key, value),
            None => super::DEFAULT_ENTRY_SIZE,
        }
    }
}

impl<K, V> Default for CacheOptions<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for CacheOptions<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("max_count", &self.max_count)
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .field("size_fn", &self.size_fn.is_some())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_unbounded() {
        let options: CacheOptions<u32, String> = CacheOptions::default();

        assert!(options.max_count.is_none());
        assert!(options.max_size.is_none());
        assert!(options.ttl.is_none());
        assert!(!options.count_exceeded(usize::MAX));
        assert!(!options.size_exceeded(u128::MAX));
        assert!(!options.bound_reached(usize::MAX, u128::MAX));
        assert_eq!(options.size_of(&1, &"abc".to_string()), 1);
    }

    #[test]
    fn test_options_builder() {
        let options: CacheOptions<u32, String> = CacheOptions::new()
            .with_max_count(2)
            .with_max_size(10)
            .with_ttl(Duration::from_secs(1))
            .with_size_fn(|_, value: &String| value.len() as u64);

        assert_eq!(options.max_count, Some(2));
        assert_eq!(options.max_size, Some(10));
        assert_eq!(options.ttl, Some(Duration::from_secs(1)));
        assert_eq!(options.size_of(&1, &"hello".to_string()), 5);
    }

    #[test]
    fn test_bound_checks_are_strict_for_set_and_inclusive_for_load() {
        let options: CacheOptions<u32, u32> = CacheOptions::new().with_max_count(2).with_max_size(20);

        assert!(!options.count_exceeded(2));
        assert!(options.count_exceeded(3));
        assert!(!options.size_exceeded(20));
        assert!(options.size_exceeded(21));

        assert!(options.bound_reached(2, 0));
        assert!(options.bound_reached(0, 20));
        assert!(!options.bound_reached(1, 19));
    }

    #[test]
    fn test_options_from_limits() {
        let limits = CacheLimits {
            max_count: Some(5),
            max_size: None,
            ttl_ms: Some(250),
        };
        let options: CacheOptions<u32, u32> = CacheOptions::from_limits(&limits);

        assert_eq!(options.max_count, Some(5));
        assert!(options.max_size.is_none());
        assert_eq!(options.ttl, Some(Duration::from_millis(250)));
        assert!(options.size_fn.is_none());
    }

    #[test]
    fn test_options_debug_hides_callbacks() {
        let options: CacheOptions<u32, u32> = CacheOptions::new().with_on_evict(|_, _| {});
        let rendered = format!("{:?}", options);
        assert!(rendered.contains("on_evict: true"));
        assert!(rendered.contains("size_fn: false"));
    }
}
