//! Registered callers.

use crate::PlanTier;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Stable identity of an account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Opaque credential presented by callers.
///
/// `Debug` output is redacted so keys never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Prefix carried by every issued key.
    pub const PREFIX: &'static str = "qr_";

    /// Issue a fresh key: the prefix followed by 32 random bytes in hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible: String = self.0.chars().take(Self::PREFIX.len() + 4).collect();
        write!(f, "ApiKey({}…)", visible)
    }
}

/// A registered caller.
///
/// Immutable once created except for `plan`, which billing upgrades may change
/// between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Account {
    id: AccountId,
    api_key: ApiKey,
    plan: PlanTier,
    billing_customer_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Assemble an account record read from persistence.
    pub fn new(
        id: AccountId,
        api_key: ApiKey,
        plan: PlanTier,
        billing_customer_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            api_key,
            plan,
            billing_customer_id,
            created_at,
        }
    }

    /// Copy of this account on a different plan.
    pub fn with_plan(mut self, plan: PlanTier) -> Self {
        self.plan = plan;
        self
    }
}

/// Account fields supplied at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Issued credential
    pub api_key: ApiKey,
    /// Initial plan
    pub plan: PlanTier,
    /// Reference returned by the billing provider
    pub billing_customer_id: Option<String>,
}

impl NewAccount {
    /// A free-plan registration.
    pub fn free(api_key: ApiKey, billing_customer_id: Option<String>) -> Self {
        Self {
            api_key,
            plan: PlanTier::Free,
            billing_customer_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_prefixed_hex() {
        let key = ApiKey::generate();
        let body = key.as_str().strip_prefix("qr_").unwrap();
        assert_eq!(body.len(), 64);
        assert!(body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_keys_are_unique() {
        assert_ne!(ApiKey::generate(), ApiKey::generate());
    }

    #[test]
    fn debug_output_redacts_key() {
        let key = ApiKey::from("qr_0123456789abcdef");
        let debug = format!("{:?}", key);
        assert!(debug.contains("qr_0123"));
        assert!(!debug.contains("89abcdef"));
    }
}
