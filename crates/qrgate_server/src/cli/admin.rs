//! Administrative commands.

use qrgate_core::{ApiKey, PlanTier};
use qrgate_error::QrGateResult;
use qrgate_rate_limit::QrGateConfig;
use qrgate_server::{Backends, build_gateway};
use serde_json::json;
use tracing::warn;

fn admin_backends() -> QrGateResult<Backends> {
    let backends = Backends::from_env()?;
    if backends.name() == "memory" {
        warn!("Using in-memory backends; changes are discarded when this command exits");
    }
    Ok(backends)
}

/// Apply pending migrations to the database named by `DATABASE_URL`.
#[cfg(feature = "database")]
pub fn migrate() -> QrGateResult<()> {
    use qrgate_database::{database_url, establish_pool, run_migrations};

    let pool = establish_pool(&database_url()?)?;
    let applied = run_migrations(&pool)?;
    println!("Applied {} migration(s)", applied);
    Ok(())
}

/// Without database support there is nothing to migrate.
#[cfg(not(feature = "database"))]
pub fn migrate() -> QrGateResult<()> {
    Err(qrgate_error::ConfigError::new(
        "qrgate was built without the database feature; rebuild with --features database",
    )
    .into())
}

/// Register a free-plan account and print its credentials.
pub async fn register(config: &QrGateConfig) -> QrGateResult<()> {
    let gateway = build_gateway(config, admin_backends()?)?;
    let registration = gateway.register().await?;
    let account = &registration.account;
    println!(
        "{:#}",
        json!({
            "api_key": account.api_key(),
            "plan": account.plan(),
            "limit": registration.limit,
        })
    );
    Ok(())
}

/// Change the plan of the account holding `api_key`.
pub async fn set_plan(config: &QrGateConfig, api_key: String, tier: PlanTier) -> QrGateResult<()> {
    let gateway = build_gateway(config, admin_backends()?)?;
    let account = gateway.set_plan(&ApiKey::from(api_key), tier).await?;
    let quota = gateway.catalog().get(*account.plan()).quota();
    println!(
        "Account {} is now on the {} plan ({} QR codes per month)",
        account.id(),
        account.plan(),
        quota
    );
    Ok(())
}

/// Validate configuration and print the effective settings.
pub fn check_config(config: &QrGateConfig) -> QrGateResult<()> {
    config.validate()?;
    let catalog = config.plan_catalog()?;

    println!("Configuration OK");
    println!("  bind:           {}", config.server.bind);
    println!("  base_url:       {}", config.server.base_url);
    println!(
        "  rate limit:     {} burst, 1 token per {} ms",
        config.rate_limit.capacity, config.rate_limit.refill_interval_ms
    );
    println!("  quota policy:   {:?}", config.usage.quota_policy);
    println!("  counter ttl:    {} days", config.usage.counter_ttl_days);
    println!("  auth cache ttl: {} s", config.auth.cache_ttl_secs);
    println!("  billing:        {:?}", config.billing.provider);
    println!("  plans:");
    for plan in catalog.iter() {
        let features: Vec<String> = plan.features().iter().map(|f| f.to_string()).collect();
        println!(
            "    {:<9} {:>7} / month  [{}]",
            plan.tier().to_string(),
            plan.quota(),
            features.join(", ")
        );
    }
    Ok(())
}
