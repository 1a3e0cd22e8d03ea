//! Per-account admission control using governor.
//!
//! One keyed GCRA limiter holds every account's bucket in a sharded concurrent
//! map, so concurrent requests for the same account always consult the same
//! state while unrelated accounts never contend on a shared lock.

use crate::RateLimitConfig;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use qrgate_core::AccountId;
use qrgate_error::ConfigError;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Token bucket shape shared by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct RatePolicy {
    capacity: NonZeroU32,
    refill_interval: Duration,
}

impl RatePolicy {
    /// A bucket holding `capacity` tokens that regains one every `refill_interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is zero.
    pub fn new(capacity: u32, refill_interval: Duration) -> Result<Self, ConfigError> {
        let capacity = NonZeroU32::new(capacity)
            .ok_or_else(|| ConfigError::new("rate_limit.capacity must be positive"))?;
        if refill_interval.is_zero() {
            return Err(ConfigError::new("rate_limit.refill_interval_ms must be positive"));
        }
        Ok(Self {
            capacity,
            refill_interval,
        })
    }

    /// Policy described by a `[rate_limit]` section.
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.capacity,
            Duration::from_millis(config.refill_interval_ms),
        )
    }

    fn quota(&self) -> Result<Quota, ConfigError> {
        Quota::with_period(self.refill_interval)
            .map(|quota| quota.allow_burst(self.capacity))
            .ok_or_else(|| ConfigError::new("rate_limit.refill_interval_ms must be positive"))
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            capacity: NonZeroU32::MIN.saturating_add(9),
            refill_interval: Duration::from_secs(6),
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A token was taken
    Admitted,
    /// The bucket is empty
    Rejected {
        /// Earliest time a retry can succeed
        retry_after: Duration,
    },
}

impl Admission {
    /// Whether the request may proceed.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }

    /// Whole seconds until retry, rounded up and at least one.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Admitted => None,
            Self::Rejected { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
        }
    }
}

/// Registry of per-account token buckets.
///
/// Buckets are created lazily on first use and dropped by [`prune`](Self::prune)
/// once they have fully refilled. Share it behind an `Arc`.
///
/// # Example
///
/// ```
/// use qrgate_core::AccountId;
/// use qrgate_rate_limit::{AdmissionRegistry, RatePolicy};
/// use std::time::Duration;
///
/// let policy = RatePolicy::new(2, Duration::from_secs(60)).unwrap();
/// let registry = AdmissionRegistry::new(policy).unwrap();
/// let account = AccountId::new(1);
/// assert!(registry.admit(account));
/// assert!(registry.admit(account));
/// assert!(!registry.admit(account));
/// ```
pub struct AdmissionRegistry {
    limiter: DefaultKeyedRateLimiter<AccountId>,
    clock: DefaultClock,
    policy: RatePolicy,
}

impl AdmissionRegistry {
    /// Create an empty registry.
    pub fn new(policy: RatePolicy) -> Result<Self, ConfigError> {
        debug!(
            capacity = policy.capacity.get(),
            refill_ms = policy.refill_interval.as_millis() as u64,
            "Creating admission registry"
        );
        Ok(Self {
            limiter: RateLimiter::keyed(policy.quota()?),
            clock: DefaultClock::default(),
            policy,
        })
    }

    /// Bucket shape in effect.
    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// Try to take a token for `account` without blocking.
    #[instrument(skip(self, account), fields(account_id = %account))]
    pub fn check(&self, account: AccountId) -> Admission {
        match self.limiter.check_key(&account) {
            Ok(()) => {
                debug!("Admitted");
                Admission::Admitted
            }
            Err(not_until) => {
                let retry_after = not_until.wait_time_from(self.clock.now());
                warn!(retry_after_ms = retry_after.as_millis() as u64, "Rate limited");
                Admission::Rejected { retry_after }
            }
        }
    }

    /// `true` if a token was available for `account`.
    pub fn admit(&self, account: AccountId) -> bool {
        self.check(account).is_admitted()
    }

    /// Drop buckets that have fully refilled and return how many remain.
    ///
    /// A full bucket is indistinguishable from a fresh one, so pruning never
    /// changes an admission decision.
    #[instrument(skip(self))]
    pub fn prune(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let after = self.limiter.len();
        debug!(before, after, "Pruned idle buckets");
        after
    }

    /// Number of tracked accounts.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    /// Whether no account has a bucket.
    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

impl std::fmt::Debug for AdmissionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionRegistry")
            .field("policy", &self.policy)
            .field("accounts", &self.limiter.len())
            .finish()
    }
}
