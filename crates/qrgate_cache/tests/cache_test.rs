//! Tests for the TTL cache.

use qrgate_cache::{TtlCache, TtlCacheConfig, TtlCacheConfigBuilder};
use std::thread::sleep;
use std::time::Duration;

#[test]
fn zero_ttl_disables_caching() {
    let config = TtlCacheConfig::default().with_ttl_secs(0);
    let mut cache = TtlCache::new(config);
    cache.insert("key".to_string(), "value");
    assert!(cache.is_empty());
    assert_eq!(cache.get("key"), None);
}

#[test]
fn entries_expire_after_ttl() {
    let config = TtlCacheConfigBuilder::default().ttl_secs(1).build().unwrap();
    let mut cache = TtlCache::new(config);
    cache.insert("key".to_string(), 1);
    assert_eq!(cache.get("key"), Some(&1));

    sleep(Duration::from_millis(1_100));
    assert_eq!(cache.get("key"), None);
    assert!(cache.is_empty());
}

#[test]
fn remove_invalidates_entry() {
    let mut cache = TtlCache::default();
    cache.insert(7u64, "pro");
    assert_eq!(cache.remove(&7), Some("pro"));
    assert_eq!(cache.get(&7), None);
}

#[test]
fn config_deserializes_with_defaults() {
    let config: TtlCacheConfig = serde_json::from_str(r#"{"ttl_secs": 5}"#).unwrap();
    assert_eq!(*config.ttl_secs(), 5);
    assert_eq!(*config.max_size(), 10_000);
}

#[test]
fn clear_empties_cache() {
    let mut cache = TtlCache::default();
    for i in 0..10 {
        cache.insert(i, i * 2);
    }
    assert_eq!(cache.len(), 10);
    cache.clear();
    assert!(cache.is_empty());
}
