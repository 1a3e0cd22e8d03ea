//! Offline billing provider.

use async_trait::async_trait;
use qrgate_error::BillingError;
use qrgate_interface::BillingProvider;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Billing provider that never leaves the process.
///
/// Used for local development and deployments without payments. Customer
/// references are `cus_local_<n>`, unique for the lifetime of the provider.
#[derive(Debug, Clone, Default)]
pub struct NoopBilling {
    issued: Arc<AtomicU64>,
}

impl NoopBilling {
    /// Create a new no-op provider.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BillingProvider for NoopBilling {
    async fn create_customer(&self) -> Result<String, BillingError> {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(n, "NoopBilling: create_customer() called (no action taken)");
        Ok(format!("cus_local_{}", n))
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
