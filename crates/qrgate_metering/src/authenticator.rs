//! API key → account resolution.

use parking_lot::Mutex;
use qrgate_cache::{TtlCache, TtlCacheConfig};
use qrgate_core::{Account, ApiKey};
use qrgate_error::{GatewayError, GatewayErrorKind, GatewayResult};
use qrgate_interface::AccountRepository;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Resolves presented API keys to accounts.
///
/// Resolved accounts are cached for at most the configured TTL, which bounds
/// how long a plan change can go unnoticed. Unknown keys are never cached.
pub struct Authenticator {
    accounts: Arc<dyn AccountRepository>,
    cache: Mutex<TtlCache<ApiKey, Account>>,
}

impl Authenticator {
    /// Create an authenticator over `accounts`.
    pub fn new(accounts: Arc<dyn AccountRepository>, cache: TtlCacheConfig) -> Self {
        Self {
            accounts,
            cache: Mutex::new(TtlCache::new(cache)),
        }
    }

    /// Resolve the credential presented with a request.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if no key or an empty key was presented
    /// - `InvalidCredential` if the key matches no account
    /// - `StoreUnavailable` if the account store cannot be reached
    #[instrument(skip_all)]
    pub async fn authenticate(&self, presented: Option<&str>) -> GatewayResult<Account> {
        let key = match presented.map(str::trim) {
            Some(key) if !key.is_empty() => ApiKey::from(key),
            _ => {
                debug!("No API key presented");
                return Err(GatewayError::new(GatewayErrorKind::Unauthenticated));
            }
        };

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(account) = cached {
            debug!(account_id = %account.id(), "Authenticated from cache");
            return Ok(account);
        }

        match self.accounts.find_by_api_key(&key).await? {
            Some(account) => {
                debug!(account_id = %account.id(), plan = %account.plan(), "Authenticated");
                self.cache.lock().insert(key, account.clone());
                Ok(account)
            }
            None => {
                warn!("Rejected unknown API key");
                Err(GatewayError::new(GatewayErrorKind::InvalidCredential))
            }
        }
    }

    /// Forget any cached account for `key`.
    pub fn invalidate(&self, key: &ApiKey) {
        self.cache.lock().remove(key);
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("cached", &self.cache.lock().len())
            .finish_non_exhaustive()
    }
}
