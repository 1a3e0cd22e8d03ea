//! Tests for the background maintenance task.

use chrono::Utc;
use qrgate_core::{AccountId, BillingPeriod, UsageKey};
use qrgate_interface::UsageCounterStore;
use qrgate_rate_limit::{AdmissionRegistry, QrGateConfig, RatePolicy};
use qrgate_server::{Backends, build_gateway, run_housekeeping, spawn_housekeeping};
use qrgate_storage::InMemoryUsageCounterStore;
use std::sync::Arc;
use std::time::Duration;

fn key(id: i64) -> UsageKey {
    UsageKey::new(AccountId::new(id), BillingPeriod::containing(Utc::now()))
}

fn registry() -> AdmissionRegistry {
    AdmissionRegistry::new(RatePolicy::new(2, Duration::from_millis(10)).unwrap()).unwrap()
}

async fn seed_expired(store: &InMemoryUsageCounterStore, id: i64) {
    store.increment(&key(id)).await.unwrap();
    store.set_expiry(&key(id), Duration::from_millis(5)).await.unwrap();
}

#[tokio::test]
async fn test_housekeeping_purges_expired_counters_and_idle_buckets() {
    let admission = registry();
    assert!(admission.admit(AccountId::new(1)));

    let store = InMemoryUsageCounterStore::new();
    seed_expired(&store, 1).await;
    store.increment(&key(2)).await.unwrap();
    store.set_expiry(&key(2), Duration::from_secs(3_600)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    run_housekeeping(&admission, &store).await;

    assert_eq!(store.len().await, 1);
    assert_eq!(store.get(&key(2)).await.unwrap(), Some(1));
    assert!(admission.is_empty());
}

#[tokio::test]
async fn test_housekeeping_survives_store_outage() {
    let admission = registry();
    let store = InMemoryUsageCounterStore::new();
    seed_expired(&store, 1).await;
    store.set_offline(true);

    run_housekeeping(&admission, &store).await;

    store.set_offline(false);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_spawned_housekeeping_runs_periodically() {
    let store = InMemoryUsageCounterStore::new();
    seed_expired(&store, 1).await;

    let handle = spawn_housekeeping(
        Arc::new(registry()),
        Arc::new(store.clone()),
        Duration::from_millis(20),
    );
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(store.is_empty().await);
    assert!(!handle.is_finished());
    handle.abort();
}

#[test]
fn test_zero_prune_interval_is_rejected_before_serving() {
    let mut config = QrGateConfig::default();
    config.rate_limit.prune_interval_secs = 0;
    assert!(build_gateway(&config, Backends::in_memory()).is_err());
}
