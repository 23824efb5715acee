//! Expiring value cache.

use crate::clock::ClockRef;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at_ms: u64,
}

/// Cache whose entries expire `ttl` after insertion.
///
/// Eviction is lazy: an expired entry is removed by the read that finds it.
/// There is no background sweep.
pub struct ExpiringCache<K, V> {
    ttl: Duration,
    clock: ClockRef,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// # Panics
    ///
    /// Panics if `ttl` is zero. Configuration is validated before any cache
    /// is built, so a zero TTL here is a programming error.
    pub fn new(ttl: Duration, clock: ClockRef) -> Self {
        assert!(!ttl.is_zero(), "cache ttl must be > 0");
        Self {
            ttl,
            clock,
            entries: HashMap::new(),
        }
    }

    pub fn put(&mut self, key: K, value: V) {
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at_ms = self.clock.now_ms().saturating_add(ttl_ms);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at_ms,
            },
        );
    }

    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let expires_at_ms = self.entries.get(key)?.expires_at_ms;
        if expires_at_ms <= self.clock.now_ms() {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Cached value for `key`, computing and storing it with `provider` on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, provider: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = provider();
        self.put(key, value.clone());
        value
    }

    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn cache(ttl_ms: u64) -> (ExpiringCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ExpiringCache::new(Duration::from_millis(ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_returns_value_before_expiry() {
        let (mut cache, clock) = cache(1000);
        cache.put("a".to_string(), 1);
        clock.advance(Duration::from_millis(999));
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let (mut cache, clock) = cache(1000);
        cache.put("a".to_string(), 1);
        clock.advance(Duration::from_millis(1000));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_insert_with_only_computes_on_miss() {
        let (mut cache, clock) = cache(500);
        let mut calls = 0;

        let first = cache.get_or_insert_with("k".to_string(), || {
            calls += 1;
            7
        });
        let second = cache.get_or_insert_with("k".to_string(), || {
            calls += 1;
            8
        });
        assert_eq!((first, second, calls), (7, 7, 1));

        clock.advance(Duration::from_millis(600));
        let third = cache.get_or_insert_with("k".to_string(), || {
            calls += 1;
            9
        });
        assert_eq!((third, calls), (9, 2));
    }

    #[test]
    fn test_remove_and_clear() {
        let (mut cache, _clock) = cache(500);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        cache.remove("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let (mut cache, clock) = cache(u64::MAX);
        clock.advance(Duration::from_millis(5_000));
        cache.put("a".to_string(), 1);

        clock.advance(Duration::from_secs(365 * 24 * 60 * 60));
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    #[should_panic(expected = "cache ttl must be > 0")]
    fn test_zero_ttl_rejected() {
        let _ = cache(0);
    }
}
