//! Request-level orchestration: authenticate, admit, then meter.

use crate::{ArtifactService, Authenticator, Generation, MeteringService};
use qrgate_core::{
    Account, Analytics, ApiKey, ArtifactId, ArtifactView, NewAccount, PlanTier, RenderRequest,
    UsageReport,
};
use qrgate_error::{GatewayError, GatewayErrorKind, GatewayResult};
use qrgate_interface::{AccountRepository, BillingProvider};
use qrgate_rate_limit::{Admission, AdmissionRegistry, PlanCatalog};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A newly registered account and its monthly quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The stored account, including its issued key
    pub account: Account,
    /// Monthly quota of the account's plan
    pub limit: u64,
}

/// Entry point for every gateway operation.
///
/// Metered operations always run authentication, then admission, then
/// metering. A request rejected at one stage never reaches the next, so a
/// rate-limited or unauthenticated request never touches usage counters.
pub struct Gateway {
    authenticator: Authenticator,
    admission: Arc<AdmissionRegistry>,
    metering: MeteringService,
    artifacts: ArtifactService,
    accounts: Arc<dyn AccountRepository>,
    billing: Arc<dyn BillingProvider>,
}

impl Gateway {
    /// Assemble a gateway from its services.
    pub fn new(
        authenticator: Authenticator,
        admission: Arc<AdmissionRegistry>,
        metering: MeteringService,
        artifacts: ArtifactService,
        accounts: Arc<dyn AccountRepository>,
        billing: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            authenticator,
            admission,
            metering,
            artifacts,
            accounts,
            billing,
        }
    }

    /// Plans in effect.
    pub fn catalog(&self) -> &PlanCatalog {
        self.metering.catalog()
    }

    /// Shared admission registry, for housekeeping.
    pub fn admission(&self) -> &Arc<AdmissionRegistry> {
        &self.admission
    }

    /// Resolve the presented key and take an admission token.
    ///
    /// # Errors
    ///
    /// Authentication errors, or `RateLimited` with a retry hint.
    pub async fn admit(&self, presented: Option<&str>) -> GatewayResult<Account> {
        let account = self.authenticator.authenticate(presented).await?;
        match self.admission.check(*account.id()) {
            Admission::Admitted => Ok(account),
            rejected => Err(GatewayError::new(GatewayErrorKind::RateLimited {
                retry_after_secs: rejected.retry_after_secs().unwrap_or(1),
            })),
        }
    }

    /// Metered generation for the caller holding `presented`.
    #[instrument(skip_all)]
    pub async fn generate(
        &self,
        presented: Option<&str>,
        request: &RenderRequest,
    ) -> GatewayResult<Generation> {
        let account = self.admit(presented).await?;
        self.metering.check_and_consume(&account, request).await
    }

    /// Current-period usage for the caller holding `presented`.
    #[instrument(skip_all)]
    pub async fn usage(&self, presented: Option<&str>) -> GatewayResult<UsageReport> {
        let account = self.admit(presented).await?;
        self.metering.usage(&account).await
    }

    /// Register a new free-plan account with a billing customer.
    ///
    /// Nothing is persisted if the billing provider fails.
    #[instrument(skip_all, fields(provider = self.billing.provider_name()))]
    pub async fn register(&self) -> GatewayResult<Registration> {
        let customer = self.billing.create_customer().await.map_err(|e| {
            error!(error = %e, "Failed to create billing customer");
            GatewayError::from(e)
        })?;

        let account = self
            .accounts
            .create(NewAccount::free(ApiKey::generate(), Some(customer)))
            .await?;
        let limit = *self.catalog().get(*account.plan()).quota();
        info!(account_id = %account.id(), "Registered account");
        Ok(Registration { account, limit })
    }

    /// Move the account holding `api_key` to `plan`.
    ///
    /// The change is visible to this gateway immediately and to other
    /// instances within their authenticator cache TTL.
    #[instrument(skip(self, api_key))]
    pub async fn set_plan(&self, api_key: &ApiKey, plan: PlanTier) -> GatewayResult<Account> {
        let account = self
            .accounts
            .update_plan(api_key, plan)
            .await
            .map_err(|e| match e.kind() {
                qrgate_error::StoreErrorKind::NotFound => {
                    GatewayError::new(GatewayErrorKind::NotFound("Account".to_string()))
                }
                _ => GatewayError::from(e),
            })?;
        self.authenticator.invalidate(api_key);
        info!(account_id = %account.id(), "Updated plan");
        Ok(account)
    }

    /// Count a scan of `id` and return what the viewer receives.
    pub async fn view(&self, id: &ArtifactId) -> GatewayResult<ArtifactView> {
        self.artifacts.view(id).await
    }

    /// Scan statistics for `id`.
    pub async fn analytics(&self, id: &ArtifactId) -> GatewayResult<Analytics> {
        self.artifacts.analytics(id).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("admission", &self.admission)
            .field("metering", &self.metering)
            .finish_non_exhaustive()
    }
}
