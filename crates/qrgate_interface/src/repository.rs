//! Persistence and counter store capabilities.

use async_trait::async_trait;
use qrgate_core::{Account, ApiKey, Artifact, ArtifactId, NewAccount, NewArtifact, PlanTier, UsageKey};
use qrgate_error::StoreResult;
use std::time::Duration;

/// Registered accounts, looked up by their unique API key.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account and return it with its assigned identity.
    ///
    /// Fails with `Conflict` if the API key is already taken.
    async fn create(&self, account: NewAccount) -> StoreResult<Account>;

    /// Resolve an API key. `Ok(None)` means the key is unknown.
    async fn find_by_api_key(&self, api_key: &ApiKey) -> StoreResult<Option<Account>>;

    /// Move an account to another plan tier.
    ///
    /// Fails with `NotFound` if the key is unknown.
    async fn update_plan(&self, api_key: &ApiKey, plan: PlanTier) -> StoreResult<Account>;
}

/// Rendered artifacts and their scan counters.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Persist a freshly rendered artifact with zero scans.
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact>;

    /// Atomically increment the scan counter and return the updated record.
    ///
    /// Fails with `NotFound` if the artifact does not exist.
    async fn record_scan(&self, id: &ArtifactId) -> StoreResult<Artifact>;

    /// Read an artifact without touching its scan counter.
    async fn get(&self, id: &ArtifactId) -> StoreResult<Option<Artifact>>;
}

/// Expiring integer counters keyed by account and billing period.
///
/// Implementations must make `increment` and `decrement` atomic: concurrent
/// calls for the same key never lose updates. An absent or expired key reads as
/// `None`, which is distinct from the store being unreachable.
#[async_trait]
pub trait UsageCounterStore: Send + Sync {
    /// Current count, or `None` if the key does not exist.
    async fn get(&self, key: &UsageKey) -> StoreResult<Option<u64>>;

    /// Add one and return the new count. A missing key starts from zero.
    async fn increment(&self, key: &UsageKey) -> StoreResult<u64>;

    /// Subtract one, never going below zero, and return the new count.
    async fn decrement(&self, key: &UsageKey) -> StoreResult<u64>;

    /// Expire the key `ttl` from now.
    async fn set_expiry(&self, key: &UsageKey, ttl: Duration) -> StoreResult<()>;

    /// Delete every expired key and return how many were removed.
    async fn purge_expired(&self) -> StoreResult<usize>;
}
