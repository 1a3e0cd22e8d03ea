//! Tests for the in-memory backends.

use chrono::Utc;
use qrgate_core::{
    AccountId, ApiKey, ArtifactId, BillingPeriod, NewAccount, NewArtifact, PlanTier, UsageKey,
};
use qrgate_error::StoreErrorKind;
use qrgate_interface::{AccountRepository, ArtifactRepository, UsageCounterStore};
use qrgate_storage::{
    InMemoryAccountRepository, InMemoryArtifactRepository, InMemoryUsageCounterStore,
};
use std::time::Duration;

fn key(account: i64) -> UsageKey {
    UsageKey::new(AccountId::new(account), BillingPeriod::containing(Utc::now()))
}

#[tokio::test]
async fn test_accounts_round_trip_and_reject_duplicates() {
    let repo = InMemoryAccountRepository::new();
    let api_key = ApiKey::generate();

    let created = repo
        .create(NewAccount::free(api_key.clone(), Some("cus_1".to_string())))
        .await
        .unwrap();
    assert_eq!(*created.plan(), PlanTier::Free);

    let found = repo.find_by_api_key(&api_key).await.unwrap().unwrap();
    assert_eq!(found, created);

    let err = repo.create(NewAccount::free(api_key, None)).await.unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::Conflict(_)));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_unknown_key_is_none() {
    let repo = InMemoryAccountRepository::new();
    let found = repo.find_by_api_key(&ApiKey::from("qr_nope")).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_update_plan() {
    let repo = InMemoryAccountRepository::new();
    let api_key = ApiKey::generate();
    repo.create(NewAccount::free(api_key.clone(), None)).await.unwrap();

    let upgraded = repo.update_plan(&api_key, PlanTier::Pro).await.unwrap();
    assert_eq!(*upgraded.plan(), PlanTier::Pro);
    let found = repo.find_by_api_key(&api_key).await.unwrap().unwrap();
    assert_eq!(*found.plan(), PlanTier::Pro);

    let err = repo
        .update_plan(&ApiKey::from("qr_missing"), PlanTier::Pro)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_record_scan_increments_and_reads() {
    let repo = InMemoryArtifactRepository::new();
    let id = ArtifactId::from("abc123");
    repo.create(NewArtifact {
        id: id.clone(),
        account_id: AccountId::new(1),
        payload: "https://example.com".to_string(),
    })
    .await
    .unwrap();

    let first = repo.record_scan(&id).await.unwrap();
    assert_eq!(*first.scans(), 1);
    assert_eq!(first.payload(), "https://example.com");

    let err = repo.record_scan(&ArtifactId::from("missing")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_concurrent_scans_are_not_lost() {
    let repo = InMemoryArtifactRepository::new();
    let id = ArtifactId::generate();
    repo.create(NewArtifact {
        id: id.clone(),
        account_id: AccountId::new(1),
        payload: "hello".to_string(),
    })
    .await
    .unwrap();

    let views = (0..50).map(|_| {
        let repo = repo.clone();
        let id = id.clone();
        tokio::spawn(async move { repo.record_scan(&id).await })
    });
    for view in futures::future::join_all(views).await {
        view.unwrap().unwrap();
    }

    let artifact = repo.get(&id).await.unwrap().unwrap();
    assert_eq!(*artifact.scans(), 50);
}

#[tokio::test]
async fn test_counter_absent_until_incremented() {
    let store = InMemoryUsageCounterStore::new();
    let key = key(1);
    assert_eq!(store.get(&key).await.unwrap(), None);
    assert_eq!(store.increment(&key).await.unwrap(), 1);
    assert_eq!(store.increment(&key).await.unwrap(), 2);
    assert_eq!(store.get(&key).await.unwrap(), Some(2));
    assert_eq!(store.get(&self::key(2)).await.unwrap(), None);
}

#[tokio::test]
async fn test_decrement_floors_at_zero() {
    let store = InMemoryUsageCounterStore::new();
    let key = key(1);
    assert_eq!(store.decrement(&key).await.unwrap(), 0);
    store.increment(&key).await.unwrap();
    assert_eq!(store.decrement(&key).await.unwrap(), 0);
    assert_eq!(store.decrement(&key).await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_counter_reads_absent_and_restarts() {
    let store = InMemoryUsageCounterStore::new();
    let key = key(1);
    store.increment(&key).await.unwrap();
    store.increment(&key).await.unwrap();
    store.set_expiry(&key, Duration::from_millis(20)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.get(&key).await.unwrap(), None);
    assert_eq!(store.increment(&key).await.unwrap(), 1);
}

#[tokio::test]
async fn test_purge_removes_only_expired_counters() {
    let store = InMemoryUsageCounterStore::new();
    let stale = key(1);
    let live = key(2);
    store.increment(&stale).await.unwrap();
    store.set_expiry(&stale, Duration::from_millis(10)).await.unwrap();
    store.increment(&live).await.unwrap();
    store.set_expiry(&live, Duration::from_secs(3_600)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.len().await, 2);
    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.len().await, 1);
    assert_eq!(store.ttl(&stale).await, None);
    assert_eq!(store.get(&live).await.unwrap(), Some(1));
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_fails_while_offline() {
    let store = InMemoryUsageCounterStore::new();
    store.set_offline(true);
    let err = store.purge_expired().await.unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_set_expiry_refreshes_ttl() {
    let store = InMemoryUsageCounterStore::new();
    let key = key(1);
    store.increment(&key).await.unwrap();
    store
        .set_expiry(&key, Duration::from_secs(32 * 24 * 60 * 60))
        .await
        .unwrap();
    let ttl = store.ttl(&key).await.unwrap();
    assert!(ttl > Duration::from_secs(31 * 24 * 60 * 60));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_atomic() {
    let store = InMemoryUsageCounterStore::new();
    let key = key(7);

    let tasks = (0..200).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.increment(&key).await })
    });
    let mut seen: Vec<u64> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();
    seen.sort_unstable();

    assert_eq!(seen, (1..=200).collect::<Vec<_>>());
    assert_eq!(store.get(&key).await.unwrap(), Some(200));
}

#[tokio::test]
async fn test_offline_store_is_unavailable_not_zero() {
    let store = InMemoryUsageCounterStore::new();
    store.set_offline(true);
    let err = store.get(&key(1)).await.unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::Unavailable(_)));
    store.set_offline(false);
    assert_eq!(store.get(&key(1)).await.unwrap(), None);
}
