//! PostgreSQL backend tests.
//!
//! These need a reachable database in `TEST_DATABASE_URL` or `DATABASE_URL`.

use chrono::Utc;
use qrgate_core::{
    AccountId, ApiKey, ArtifactId, BillingPeriod, NewAccount, NewArtifact, PlanTier, UsageKey,
};
use qrgate_database::{
    DbPool, PostgresAccountRepository, PostgresArtifactRepository, PostgresUsageCounterStore,
    establish_pool, run_migrations,
};
use qrgate_error::StoreErrorKind;
use qrgate_interface::{AccountRepository, ArtifactRepository, UsageCounterStore};
use std::time::Duration;

fn pool() -> DbPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("TEST_DATABASE_URL or DATABASE_URL must be set");
    let pool = establish_pool(&database_url).unwrap();
    run_migrations(&pool).unwrap();
    pool
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_account_lifecycle() {
    let accounts = PostgresAccountRepository::new(pool());
    let api_key = ApiKey::generate();

    let created = accounts
        .create(NewAccount::free(api_key.clone(), Some("cus_test".to_string())))
        .await
        .unwrap();
    assert_eq!(*created.plan(), PlanTier::Free);

    let err = accounts
        .create(NewAccount::free(api_key.clone(), None))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::Conflict(_)));

    let upgraded = accounts.update_plan(&api_key, PlanTier::Business).await.unwrap();
    assert_eq!(*upgraded.plan(), PlanTier::Business);

    let missing = accounts.find_by_api_key(&ApiKey::generate()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_artifact_scans() {
    let pool = pool();
    let accounts = PostgresAccountRepository::new(pool.clone());
    let artifacts = PostgresArtifactRepository::new(pool);
    let owner = accounts
        .create(NewAccount::free(ApiKey::generate(), None))
        .await
        .unwrap();

    let id = ArtifactId::generate();
    artifacts
        .create(NewArtifact {
            id: id.clone(),
            account_id: *owner.id(),
            payload: "https://example.com".to_string(),
        })
        .await
        .unwrap();

    let views: Vec<_> = (0..2)
        .map(|_| {
            let artifacts = artifacts.clone();
            let id = id.clone();
            tokio::spawn(async move { artifacts.record_scan(&id).await })
        })
        .collect();
    for view in views {
        view.await.unwrap().unwrap();
    }
    assert_eq!(*artifacts.get(&id).await.unwrap().unwrap().scans(), 2);

    let err = artifacts
        .record_scan(&ArtifactId::generate())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_counter_semantics() {
    let counters = PostgresUsageCounterStore::new(pool());
    let key = UsageKey::new(
        AccountId::new(i64::from(rand_suffix())),
        BillingPeriod::containing(Utc::now()),
    );

    assert_eq!(counters.get(&key).await.unwrap(), None);
    assert_eq!(counters.increment(&key).await.unwrap(), 1);
    assert_eq!(counters.increment(&key).await.unwrap(), 2);
    assert_eq!(counters.decrement(&key).await.unwrap(), 1);

    counters.set_expiry(&key, Duration::from_millis(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(counters.get(&key).await.unwrap(), None);
    assert_eq!(counters.increment(&key).await.unwrap(), 1);
    counters.purge_expired().await.unwrap();
}

fn rand_suffix() -> u32 {
    Utc::now().timestamp_subsec_nanos()
}
