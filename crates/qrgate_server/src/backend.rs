//! Backend selection and gateway assembly.

use qrgate_billing::{NoopBilling, StripeBilling};
use qrgate_error::QrGateResult;
use qrgate_interface::{AccountRepository, ArtifactRepository, BillingProvider, UsageCounterStore};
use qrgate_metering::{ArtifactService, Authenticator, Gateway, MeteringService};
use qrgate_rate_limit::{
    AdmissionRegistry, BillingConfig, BillingProviderKind, QrGateConfig, RatePolicy,
};
use qrgate_render::QrCodeRenderer;
use qrgate_storage::{
    InMemoryAccountRepository, InMemoryArtifactRepository, InMemoryUsageCounterStore,
};
use std::sync::Arc;
use tracing::info;

/// Persistence and counter store implementations behind a gateway.
#[derive(Clone)]
pub struct Backends {
    /// Account records
    pub accounts: Arc<dyn AccountRepository>,
    /// Artifact records
    pub artifacts: Arc<dyn ArtifactRepository>,
    /// Per-period usage counters
    pub counters: Arc<dyn UsageCounterStore>,
    name: &'static str,
}

impl Backends {
    /// Process-local backends. State is lost on restart.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            artifacts: Arc::new(InMemoryArtifactRepository::new()),
            counters: Arc::new(InMemoryUsageCounterStore::new()),
            name: "memory",
        }
    }

    /// PostgreSQL backends sharing one connection pool.
    #[cfg(feature = "database")]
    pub fn postgres(pool: qrgate_database::DbPool) -> Self {
        use qrgate_database::{
            PostgresAccountRepository, PostgresArtifactRepository, PostgresUsageCounterStore,
        };

        Self {
            accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
            artifacts: Arc::new(PostgresArtifactRepository::new(pool.clone())),
            counters: Arc::new(PostgresUsageCounterStore::new(pool)),
            name: "postgres",
        }
    }

    /// PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
    pub fn from_env() -> QrGateResult<Self> {
        match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::connect(&url),
            _ => {
                info!("DATABASE_URL not set, using in-memory backends");
                Ok(Self::in_memory())
            }
        }
    }

    #[cfg(feature = "database")]
    fn connect(url: &str) -> QrGateResult<Self> {
        let pool = qrgate_database::establish_pool(url)?;
        info!("Connected to PostgreSQL");
        Ok(Self::postgres(pool))
    }

    #[cfg(not(feature = "database"))]
    fn connect(_url: &str) -> QrGateResult<Self> {
        tracing::warn!("DATABASE_URL is set but qrgate was built without the database feature, using in-memory backends");
        Ok(Self::in_memory())
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").field("name", &self.name).finish()
    }
}

/// Billing provider selected by configuration.
///
/// # Errors
///
/// Fails when Stripe is selected and `STRIPE_SECRET_KEY` is not set.
pub fn billing_provider(config: &BillingConfig) -> QrGateResult<Arc<dyn BillingProvider>> {
    let provider: Arc<dyn BillingProvider> = match config.provider {
        BillingProviderKind::Noop => Arc::new(NoopBilling::new()),
        BillingProviderKind::Stripe => Arc::new(StripeBilling::from_env()?),
    };
    info!(provider = provider.provider_name(), "Selected billing provider");
    Ok(provider)
}

/// Assemble a gateway from validated configuration, using the configured
/// billing provider.
pub fn build_gateway(config: &QrGateConfig, backends: Backends) -> QrGateResult<Gateway> {
    let billing = billing_provider(&config.billing)?;
    build_gateway_with(config, backends, billing)
}

/// Assemble a gateway with an explicit billing provider.
pub fn build_gateway_with(
    config: &QrGateConfig,
    backends: Backends,
    billing: Arc<dyn BillingProvider>,
) -> QrGateResult<Gateway> {
    config.validate()?;
    let catalog = config.plan_catalog()?;
    let admission = AdmissionRegistry::new(RatePolicy::from_config(&config.rate_limit)?)?;

    let metering = MeteringService::new(
        Arc::clone(&backends.counters),
        Arc::clone(&backends.artifacts),
        Arc::new(QrCodeRenderer::new()),
        catalog,
        config.usage.clone(),
    );
    let authenticator =
        Authenticator::new(Arc::clone(&backends.accounts), config.auth.cache_config());

    info!(backend = backends.name(), "Assembled gateway");
    Ok(Gateway::new(
        authenticator,
        Arc::new(admission),
        metering,
        ArtifactService::new(backends.artifacts),
        backends.accounts,
        billing,
    ))
}
