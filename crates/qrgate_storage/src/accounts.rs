//! In-memory account repository.

use async_trait::async_trait;
use chrono::Utc;
use qrgate_core::{Account, AccountId, ApiKey, NewAccount, PlanTier};
use qrgate_error::{StoreError, StoreErrorKind, StoreResult};
use qrgate_interface::AccountRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Accounts {
    by_key: HashMap<ApiKey, Account>,
    next_id: i64,
}

/// Accounts stored in a HashMap keyed by API key.
///
/// Clones share the same storage. All data is lost when the last clone is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    inner: Arc<RwLock<Accounts>>,
}

impl InMemoryAccountRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_key.len()
    }

    /// Whether no account is registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_key.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip_all, fields(plan = %account.plan))]
    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let mut accounts = self.inner.write().await;
        if accounts.by_key.contains_key(&account.api_key) {
            return Err(StoreError::new(StoreErrorKind::Conflict(
                "api_key already registered".to_string(),
            )));
        }
        accounts.next_id += 1;
        let created = Account::new(
            AccountId::new(accounts.next_id),
            account.api_key.clone(),
            account.plan,
            account.billing_customer_id,
            Utc::now(),
        );
        accounts.by_key.insert(account.api_key, created.clone());
        debug!(account_id = %created.id(), "Stored account");
        Ok(created)
    }

    async fn find_by_api_key(&self, api_key: &ApiKey) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.by_key.get(api_key).cloned())
    }

    #[instrument(skip(self, api_key))]
    async fn update_plan(&self, api_key: &ApiKey, plan: PlanTier) -> StoreResult<Account> {
        let mut accounts = self.inner.write().await;
        let account = accounts
            .by_key
            .get_mut(api_key)
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound))?;
        *account = account.clone().with_plan(plan);
        Ok(account.clone())
    }
}
