//! In-memory expiring usage counters.

use async_trait::async_trait;
use qrgate_core::UsageKey;
use qrgate_error::{StoreError, StoreErrorKind, StoreResult};
use qrgate_interface::UsageCounterStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Usage counters held in process memory.
///
/// Expired counters read as absent and restart from zero on the next
/// increment until [`purge_expired`](UsageCounterStore::purge_expired)
/// removes them. The store can be switched offline to exercise outage handling.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use qrgate_core::{AccountId, BillingPeriod, UsageKey};
/// use qrgate_interface::UsageCounterStore;
/// use qrgate_storage::InMemoryUsageCounterStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryUsageCounterStore::new();
/// let key = UsageKey::new(AccountId::new(1), BillingPeriod::containing(Utc::now()));
/// assert_eq!(store.get(&key).await.unwrap(), None);
/// assert_eq!(store.increment(&key).await.unwrap(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsageCounterStore {
    counters: Arc<Mutex<HashMap<UsageKey, Counter>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryUsageCounterStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Overwrite a counter, for seeding tests.
    pub async fn set(&self, key: &UsageKey, count: u64) {
        let mut counters = self.counters.lock().await;
        let expires_at = counters.get(key).and_then(|c| c.expires_at);
        counters.insert(*key, Counter { count, expires_at });
    }

    /// Time left before `key` expires, if it has an expiry.
    pub async fn ttl(&self, key: &UsageKey) -> Option<Duration> {
        let counters = self.counters.lock().await;
        counters
            .get(key)
            .and_then(|c| c.expires_at)
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Number of stored counters, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.counters.lock().await.len()
    }

    /// Whether no counters are stored.
    pub async fn is_empty(&self) -> bool {
        self.counters.lock().await.is_empty()
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable(
                "counter store offline".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageCounterStore for InMemoryUsageCounterStore {
    async fn get(&self, key: &UsageKey) -> StoreResult<Option<u64>> {
        self.ensure_online()?;
        let now = Instant::now();
        let counters = self.counters.lock().await;
        Ok(counters
            .get(key)
            .filter(|c| c.is_live(now))
            .map(|c| c.count))
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn increment(&self, key: &UsageKey) -> StoreResult<u64> {
        self.ensure_online()?;
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        let counter = counters.entry(*key).or_insert(Counter {
            count: 0,
            expires_at: None,
        });
        if !counter.is_live(now) {
            *counter = Counter {
                count: 0,
                expires_at: None,
            };
        }
        counter.count += 1;
        debug!(count = counter.count, "Incremented counter");
        Ok(counter.count)
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn decrement(&self, key: &UsageKey) -> StoreResult<u64> {
        self.ensure_online()?;
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        match counters.get_mut(key) {
            Some(counter) if counter.is_live(now) => {
                counter.count = counter.count.saturating_sub(1);
                debug!(count = counter.count, "Decremented counter");
                Ok(counter.count)
            }
            _ => Ok(0),
        }
    }

    async fn set_expiry(&self, key: &UsageKey, ttl: Duration) -> StoreResult<()> {
        self.ensure_online()?;
        let mut counters = self.counters.lock().await;
        if let Some(counter) = counters.get_mut(key) {
            counter.expires_at = Instant::now().checked_add(ttl);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> StoreResult<usize> {
        self.ensure_online()?;
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        let before = counters.len();
        counters.retain(|_, counter| counter.is_live(now));
        let removed = before - counters.len();
        debug!(removed, remaining = counters.len(), "Purged expired counters");
        Ok(removed)
    }
}
