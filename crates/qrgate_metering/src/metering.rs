//! Quota enforcement around rendering.

use crate::{Clock, system_clock};
use qrgate_core::{
    Account, Artifact, ArtifactId, BillingPeriod, ImageFormat, NewArtifact, RenderRequest,
    RenderSpec, UsageKey, UsageReport,
};
use qrgate_error::{GatewayError, GatewayErrorKind, GatewayResult};
use qrgate_interface::{ArtifactRepository, QrRenderer, UsageCounterStore};
use qrgate_rate_limit::{Plan, PlanCatalog, QuotaPolicy, UsageConfig};
use std::sync::Arc;
use tracing::{Span, debug, error, info, instrument, warn};

/// A successful metered generation.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct Generation {
    artifact: Artifact,
    image: Vec<u8>,
    format: ImageFormat,
}

impl Generation {
    /// Split into the stored artifact, encoded bytes and their format.
    pub fn into_parts(self) -> (Artifact, Vec<u8>, ImageFormat) {
        (self.artifact, self.image, self.format)
    }
}

/// Orchestrates quota check, render, artifact persistence and usage recording.
///
/// A request that fails for any reason is never charged: with
/// [`QuotaPolicy::Reserve`] the reservation is released, and with
/// [`QuotaPolicy::CheckThenIncrement`] the counter is only touched after
/// success.
pub struct MeteringService {
    counters: Arc<dyn UsageCounterStore>,
    artifacts: Arc<dyn ArtifactRepository>,
    renderer: Arc<dyn QrRenderer>,
    catalog: PlanCatalog,
    usage: UsageConfig,
    clock: Clock,
}

impl MeteringService {
    /// Create a metering service using the system clock.
    pub fn new(
        counters: Arc<dyn UsageCounterStore>,
        artifacts: Arc<dyn ArtifactRepository>,
        renderer: Arc<dyn QrRenderer>,
        catalog: PlanCatalog,
        usage: UsageConfig,
    ) -> Self {
        Self {
            counters,
            artifacts,
            renderer,
            catalog,
            usage,
            clock: system_clock(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Plans in effect.
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    fn current_key(&self, account: &Account) -> UsageKey {
        UsageKey::new(*account.id(), BillingPeriod::containing((self.clock)()))
    }

    fn quota_exceeded(&self, usage: u64, plan: &Plan) -> GatewayError {
        GatewayError::new(GatewayErrorKind::QuotaExceeded {
            usage,
            limit: *plan.quota(),
            upgrade_url: self.usage.upgrade_url.clone(),
        })
    }

    /// Current-period usage. A missing counter is zero; an unreachable store
    /// is an error.
    async fn read_usage(&self, key: &UsageKey) -> GatewayResult<u64> {
        let usage = self.counters.get(key).await.map_err(|e| {
            error!(error = %e, "Failed to read usage");
            GatewayError::from(e)
        })?;
        Ok(usage.unwrap_or(0))
    }

    /// Increment and refresh the expiry, returning the new count.
    async fn record(&self, key: &UsageKey) -> GatewayResult<u64> {
        let count = self.counters.increment(key).await?;
        if let Err(e) = self.counters.set_expiry(key, self.usage.counter_ttl()).await {
            error!(error = %e, "Failed to refresh counter expiry");
            self.release(key).await;
            return Err(e.into());
        }
        Ok(count)
    }

    /// Undo one reservation. Failures are logged; the caller already has an
    /// error to report.
    async fn release(&self, key: &UsageKey) {
        match self.counters.decrement(key).await {
            Ok(count) => debug!(count, "Released usage reservation"),
            Err(e) => error!(error = %e, key = %key, "Failed to release usage reservation"),
        }
    }

    async fn render(&self, spec: RenderSpec) -> GatewayResult<Vec<u8>> {
        let renderer = Arc::clone(&self.renderer);
        tokio::task::spawn_blocking(move || renderer.render(&spec))
            .await
            .map_err(|e| GatewayError::new(GatewayErrorKind::RenderFailed(e.to_string())))?
            .map_err(|e| {
                error!(error = %e, "Render failed");
                GatewayError::from(e)
            })
    }

    async fn persist(&self, account: &Account, payload: String) -> GatewayResult<Artifact> {
        let artifact = NewArtifact {
            id: ArtifactId::generate(),
            account_id: *account.id(),
            payload,
        };
        self.artifacts.create(artifact).await.map_err(|e| {
            error!(error = %e, "Failed to persist artifact");
            GatewayError::new(GatewayErrorKind::StoreUnavailable(e.kind().to_string()))
        })
    }

    /// Render `request` for `account` if its plan quota allows, and charge one
    /// unit of usage for the current billing period.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` when usage has reached the plan quota; nothing is
    ///   rendered and the counter is unchanged
    /// - `InvalidRequest` for malformed requests
    /// - `RenderFailed` when rendering fails; no usage is charged
    /// - `StoreUnavailable` when usage cannot be read or recorded
    #[instrument(skip_all, fields(account_id = %account.id(), plan = %account.plan(), period))]
    pub async fn check_and_consume(
        &self,
        account: &Account,
        request: &RenderRequest,
    ) -> GatewayResult<Generation> {
        let key = self.current_key(account);
        Span::current().record("period", tracing::field::display(key.period()));
        let plan = *self.catalog.get(*account.plan());

        let usage = self.read_usage(&key).await?;
        debug!(usage, quota = plan.quota(), "Read current usage");
        if usage >= *plan.quota() {
            warn!(usage, quota = plan.quota(), "Quota exceeded");
            return Err(self.quota_exceeded(usage, &plan));
        }

        let spec = RenderSpec::sanitize(request, *plan.features())?;
        let format = *spec.format();

        let generation = match self.usage.quota_policy {
            QuotaPolicy::Reserve => {
                let reserved = self.record(&key).await?;
                if reserved > *plan.quota() {
                    warn!(reserved, quota = plan.quota(), "Reservation overflowed quota, rolling back");
                    let after = self.counters.decrement(&key).await?;
                    return Err(self.quota_exceeded(after, &plan));
                }

                let outcome = match self.render(spec).await {
                    Ok(image) => self
                        .persist(account, request.data.clone())
                        .await
                        .map(|artifact| (artifact, image)),
                    Err(e) => Err(e),
                };
                match outcome {
                    Ok((artifact, image)) => Generation {
                        artifact,
                        image,
                        format,
                    },
                    Err(e) => {
                        self.release(&key).await;
                        return Err(e);
                    }
                }
            }
            QuotaPolicy::CheckThenIncrement => {
                let image = self.render(spec).await?;
                let artifact = self.persist(account, request.data.clone()).await?;
                self.record(&key).await?;
                Generation {
                    artifact,
                    image,
                    format,
                }
            }
        };

        info!(artifact_id = %generation.artifact.id(), "Generated artifact");
        Ok(generation)
    }

    /// Usage summary for the current billing period.
    #[instrument(skip_all, fields(account_id = %account.id()))]
    pub async fn usage(&self, account: &Account) -> GatewayResult<UsageReport> {
        let key = self.current_key(account);
        let plan = self.catalog.get(*account.plan());
        let usage = self.read_usage(&key).await?;
        Ok(UsageReport::new(
            *account.plan(),
            usage,
            *plan.quota(),
            key.period(),
        ))
    }
}

impl std::fmt::Debug for MeteringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeteringService")
            .field("catalog", &self.catalog)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}
