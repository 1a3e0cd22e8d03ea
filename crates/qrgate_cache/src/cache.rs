//! TTL cache with least-recently-used eviction.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
    #[getter(skip)]
    last_access: u64,
}

impl<V> CacheEntry<V> {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Configuration for [`TtlCache`].
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct TtlCacheConfig {
    /// Lifetime of cached entries (seconds). Zero disables the cache.
    #[serde(default = "default_ttl")]
    #[builder(default = "default_ttl()")]
    ttl_secs: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_size")]
    #[builder(default = "default_max_size()")]
    max_size: usize,
}

fn default_ttl() -> u64 {
    30
}

fn default_max_size() -> usize {
    10_000
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_size: default_max_size(),
        }
    }
}

impl TtlCacheConfig {
    /// Whether entries are retained at all.
    pub fn enabled(&self) -> bool {
        self.ttl_secs > 0 && self.max_size > 0
    }
}

/// Bounded map whose entries expire after a fixed TTL.
///
/// When full, inserting a new key evicts the least recently read or written
/// entry. The cache is not synchronized; share it behind a lock.
///
/// # Example
///
/// ```
/// use qrgate_cache::{TtlCache, TtlCacheConfig};
///
/// let mut cache = TtlCache::new(TtlCacheConfig::default());
/// cache.insert("qr_abc".to_string(), 42u64);
/// assert_eq!(cache.get("qr_abc"), Some(&42));
/// assert_eq!(cache.get("qr_missing"), None);
/// ```
#[derive(Debug)]
pub struct TtlCache<K, V> {
    config: TtlCacheConfig,
    entries: HashMap<K, CacheEntry<V>>,
    tick: u64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
{
    /// Create a new cache with configuration.
    pub fn new(config: TtlCacheConfig) -> Self {
        tracing::debug!(
            ttl_secs = config.ttl_secs,
            max_size = config.max_size,
            "Creating new TtlCache"
        );
        Self {
            config,
            entries: HashMap::new(),
            tick: 0,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &TtlCacheConfig {
        &self.config
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Insert or replace a value.
    #[tracing::instrument(skip_all, fields(cache_size = self.entries.len()))]
    pub fn insert(&mut self, key: K, value: V) {
        if !self.config.enabled() {
            tracing::debug!("Cache disabled, skipping insert");
            return;
        }

        if self.entries.len() >= self.config.max_size && !self.entries.contains_key(&key) {
            self.cleanup_expired();
            if self.entries.len() >= self.config.max_size {
                self.evict_lru();
            }
        }

        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
            ttl: Duration::from_secs(self.config.ttl_secs),
            last_access: self.next_tick(),
        };
        self.entries.insert(key, entry);
        tracing::debug!("Inserted entry into cache");
    }

    /// Get a live value, refreshing its recency.
    ///
    /// Expired entries are removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if !self.config.enabled() {
            return None;
        }

        if self.entries.get(key)?.is_expired() {
            tracing::debug!("Cache entry expired, removing");
            self.entries.remove(key);
            return None;
        }

        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_access = tick;
        tracing::debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
        Some(&entry.value)
    }

    /// Drop one entry, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Remove expired entries from cache.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    /// Clear all cache entries.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Get number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(_, entry)| entry.last_access);
        if let Some(oldest) = oldest {
            self.entries.retain(|_, entry| entry.last_access != oldest);
            tracing::debug!("Evicted LRU entry");
        }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(TtlCacheConfig::default())
    }
}
