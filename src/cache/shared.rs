//! Shared Cache Module
//!
//! Thread-safe handle over a single cache for concurrent callers.

use std::hash::Hash;
use std::sync::Arc;

use indexmap::Equivalent;
use tokio::sync::{Mutex, MutexGuard};

use crate::cache::{Cache, Clock, SystemClock};

/// Cloneable handle to a cache guarded by one exclusive lock.
///
/// Every operation, reads included, takes the same lock: `get` refreshes
/// recency and eviction walks the entries while removing them, so no
/// operation may interleave with another. Use [`SharedCache::lock`] to run
/// several operations as one atomic step.
pub struct SharedCache<K, V, C = SystemClock> {
    inner: Arc<Mutex<Cache<K, V, C>>>,
}

impl<K, V, C> Clone for SharedCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, C> SharedCache<K, V, C>
where
    K: Hash + Eq,
    C: Clock,
{
    /// Wraps a cache for shared use.
    pub fn new(cache: Cache<K, V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Acquires the lock for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, Cache<K, V, C>> {
        self.inner.lock().await
    }

    pub async fn set(&self, key: K, value: V) {
        self.inner.lock().await.set(key, value);
    }

    /// Returns a clone of a live value, refreshing its recency.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
        V: Clone,
    {
        self.inner.lock().await.get(key).cloned()
    }

    pub async fn has<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.inner.lock().await.has(key)
    }

    pub async fn delete<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.inner.lock().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn evict(&self) -> Option<(K, V)> {
        self.inner.lock().await.evict()
    }

    /// Removes every expired entry, returning how many were removed.
    pub async fn purge(&self) -> usize {
        self.inner.lock().await.purge()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn total_size(&self) -> u128 {
        self.inner.lock().await.total_size()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheOptions, ManualClock};
    use std::time::Duration;

    fn shared(options: CacheOptions<String, u64>) -> (SharedCache<String, u64, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = Cache::with_clock(options, clock.clone());
        (SharedCache::new(cache), clock)
    }

    #[tokio::test]
    async fn test_shared_set_get_delete() {
        let (cache, _) = shared(CacheOptions::new());

        cache.set("a".to_string(), 1).await;

        assert_eq!(cache.get("a").await, Some(1));
        assert!(cache.has("a").await);
        assert!(cache.delete("a").await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_shared_clones_see_same_cache() {
        let (cache, _) = shared(CacheOptions::new());
        let other = cache.clone();

        other.set("a".to_string(), 1).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_shared_purge_and_evict() {
        let (cache, clock) = shared(CacheOptions::new().with_ttl(Duration::from_millis(10)));

        cache.set("a".to_string(), 1).await;
        cache.set("b".to_string(), 2).await;
        clock.advance_ms(20);

        assert_eq!(cache.evict().await, Some(("a".to_string(), 1)));
        assert_eq!(cache.purge().await, 1);
        assert_eq!(cache.total_size().await, 0);
    }

    #[tokio::test]
    async fn test_shared_lock_runs_compound_operation() {
        let (cache, _) = shared(CacheOptions::new());

        {
            let mut guard = cache.lock().await;
            guard.set("a".to_string(), 1).set("b".to_string(), 2);
            guard.clear();
        }

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_shared_concurrent_writers_respect_bound() {
        let (cache, _) = shared(
            CacheOptions::new()
                .with_max_count(16)
                .with_size_fn(|_, value: &u64| *value),
        );

        let mut handles = Vec::new();
        for task in 0..8u64 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50u64 {
                    cache.set(format!("{}-{}", task, i), i % 5 + 1).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let guard = cache.lock().await;
        assert_eq!(guard.len(), 16);
        let expected: u64 = guard.values().sum();
        assert_eq!(guard.total_size(), u128::from(expected));
    }
}
