//! Item Cache Module
//!
//! TTL cache keyed by canonical address keys, with an optional capacity bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::cache::{CacheEntry, CacheStats, RecencyTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::storage::Item;

// == Cache Error ==
/// Reasons the cache refuses an entry. Never surfaced to clients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("key exceeds maximum length of {} bytes", MAX_KEY_LENGTH)]
    KeyTooLong,

    #[error("value exceeds maximum size of {} bytes", MAX_VALUE_SIZE)]
    ValueTooLarge,
}

// == Item Cache ==
/// Single-threaded cache storage. Share it through [`Cache`].
#[derive(Debug)]
pub struct ItemCache {
    entries: HashMap<String, CacheEntry>,
    recency: RecencyTracker,
    stats: CacheStats,
    /// TTL applied when `set` gets no override
    time_to_live: Duration,
    /// None = unbounded
    max_entries: Option<usize>,
}

impl ItemCache {
    // == Constructor ==
    /// Creates a cache whose entries live for `time_to_live` (zero = forever).
    pub fn new(time_to_live: Duration, max_entries: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyTracker::new(),
            stats: CacheStats::new(),
            time_to_live,
            max_entries,
        }
    }

    // == Has ==
    /// True when a live entry exists for `key`. Expired entries are dropped.
    pub fn has(&mut self, key: &str) -> bool {
        self.live_entry(key).is_some()
    }

    // == Get ==
    /// Returns the live value for `key`, counting a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<Item> {
        let value = self.live_entry(key).map(|entry| entry.value.clone());
        match value {
            Some(_) => {
                self.stats.record_hit();
                self.recency.touch(key);
            }
            None => self.stats.record_miss(),
        }
        value
    }

    // == Peek ==
    /// Like [`get`](Self::get) but leaves stats and recency untouched.
    pub fn peek(&mut self, key: &str) -> Option<Item> {
        self.live_entry(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or overwrites `key`, restarting its TTL.
    ///
    /// When the cache is bounded and full, the least recently used entry is
    /// evicted first.
    pub fn set(
        &mut self,
        key: &str,
        value: Item,
        ttl_override: Option<Duration>,
    ) -> Result<(), CacheError> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::KeyTooLong);
        }
        if value.to_string().len() > MAX_VALUE_SIZE {
            return Err(CacheError::ValueTooLarge);
        }

        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(key) && self.entries.len() >= max {
                if let Some(coldest) = self.recency.pop_coldest() {
                    self.entries.remove(&coldest);
                    self.stats.record_eviction();
                }
            }
        }

        let ttl = ttl_override.unwrap_or(self.time_to_live);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.recency.touch(key);

        Ok(())
    }

    // == Remove ==
    /// Drops `key`, returning whether an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.recency.forget(key);
        self.entries.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.recency.forget(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entries = self.entries.len();
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_entry(&mut self, key: &str) -> Option<&CacheEntry> {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            self.entries.remove(key);
            self.recency.forget(key);
            self.stats.record_expirations(1);
            return None;
        }
        self.entries.get(key)
    }
}

// == Shared Cache ==
/// Cloneable handle to one [`ItemCache`] shared by every request.
///
/// All operations are synchronous and hold the lock only for the call.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<Mutex<ItemCache>>,
}

impl Cache {
    pub fn new(time_to_live: Duration, max_entries: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ItemCache::new(time_to_live, max_entries))),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.lock().has(key)
    }

    pub fn get(&self, key: &str) -> Option<Item> {
        self.inner.lock().get(key)
    }

    pub fn peek(&self, key: &str) -> Option<Item> {
        self.inner.lock().peek(key)
    }

    pub fn set(
        &self,
        key: &str,
        value: Item,
        ttl_override: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.inner.lock().set(key, value, ttl_override)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().remove(key)
    }

    pub fn cleanup_expired(&self) -> usize {
        self.inner.lock().cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(600);

    #[test]
    fn test_set_and_get() {
        let mut cache = ItemCache::new(TTL, None);

        cache.set("main/foo", json!({"v": 1}), None).unwrap();

        assert!(cache.has("main/foo"));
        assert_eq!(cache.get("main/foo"), Some(json!({"v": 1})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_absent() {
        let mut cache = ItemCache::new(TTL, None);

        assert!(!cache.has("main/nope"));
        assert_eq!(cache.get("main/nope"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_peek_does_not_count() {
        let mut cache = ItemCache::new(TTL, None);
        assert_eq!(cache.peek("main/foo"), None);

        cache.set("main/foo", json!(1), None).unwrap();
        assert_eq!(cache.peek("main/foo"), Some(json!(1)));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let mut cache = ItemCache::new(TTL, None);

        cache.set("users/42", json!("old"), None).unwrap();
        cache.set("users/42", json!("new"), None).unwrap();

        assert_eq!(cache.get("users/42"), Some(json!("new")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let mut cache = ItemCache::new(Duration::from_secs(10), None);
        cache.set("main/foo", json!(1), None).unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.has("main/foo"));

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert!(!cache.has("main/foo"));
        assert_eq!(cache.get("main/foo"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_override() {
        let mut cache = ItemCache::new(Duration::from_secs(600), None);
        cache
            .set("main/short", json!(1), Some(Duration::from_secs(1)))
            .unwrap();
        cache.set("main/long", json!(2), None).unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(!cache.has("main/short"));
        assert!(cache.has("main/long"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let mut cache = ItemCache::new(Duration::from_secs(10), None);
        cache.set("main/foo", json!(1), None).unwrap();

        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("main/foo", json!(2), None).unwrap();

        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get("main/foo"), Some(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let mut cache = ItemCache::new(Duration::ZERO, None);
        cache.set("main/foo", json!(1), None).unwrap();

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert!(cache.has("main/foo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let mut cache = ItemCache::new(TTL, None);
        cache
            .set("main/a", json!(1), Some(Duration::from_secs(1)))
            .unwrap();
        cache
            .set("main/b", json!(2), Some(Duration::from_secs(10)))
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("main/b"));
    }

    #[test]
    fn test_bounded_cache_evicts_coldest() {
        let mut cache = ItemCache::new(TTL, Some(2));
        cache.set("main/a", json!(1), None).unwrap();
        cache.set("main/b", json!(2), None).unwrap();

        // refresh a so b becomes the coldest
        cache.get("main/a");
        cache.set("main/c", json!(3), None).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.has("main/a"));
        assert!(!cache.has("main/b"));
        assert!(cache.has("main/c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_unbounded_cache_grows() {
        let mut cache = ItemCache::new(TTL, None);
        for i in 0..500 {
            cache.set(&format!("main/{i}"), json!(i), None).unwrap();
        }
        assert_eq!(cache.len(), 500);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_remove() {
        let mut cache = ItemCache::new(TTL, None);
        cache.set("main/a", json!(1), None).unwrap();

        assert!(cache.remove("main/a"));
        assert!(!cache.remove("main/a"));
        assert!(!cache.has("main/a"));
    }

    #[test]
    fn test_oversized_key_and_value_rejected() {
        let mut cache = ItemCache::new(TTL, None);
        let long_key = "k".repeat(MAX_KEY_LENGTH + 1);
        let big_value = json!("v".repeat(MAX_VALUE_SIZE));

        assert_eq!(
            cache.set(&long_key, json!(1), None),
            Err(CacheError::KeyTooLong)
        );
        assert_eq!(
            cache.set("main/big", big_value, None),
            Err(CacheError::ValueTooLarge)
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_handle_sees_same_entries() {
        let cache = Cache::new(TTL, None);
        let other = cache.clone();

        cache.set("main/a", json!(1), None).unwrap();

        assert!(other.has("main/a"));
        assert_eq!(other.get("main/a"), Some(json!(1)));
        assert_eq!(other.stats().hits, 1);
    }
}
