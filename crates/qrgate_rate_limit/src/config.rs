//! Configuration structures for qrgate.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from qrgate.toml)
//! - User overrides (~/.config/qrgate/qrgate.toml or ./qrgate.toml)
//! - Environment overrides (`QRGATE__RATE_LIMIT__CAPACITY=20`)
//!
//! Secrets such as `DATABASE_URL` and `STRIPE_SECRET_KEY` are never read from
//! these files.

use crate::PlanCatalog;
use config::{Config, Environment, File, FileFormat};
use qrgate_cache::TtlCacheConfig;
use qrgate_core::Feature;
use qrgate_error::{ConfigError, QrGateError, QrGateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../qrgate.toml");

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL used in artifact links
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
        }
    }
}

/// Per-account token bucket settings.
///
/// ```toml
/// [rate_limit]
/// capacity = 10
/// refill_interval_ms = 6_000
/// prune_interval_secs = 300
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Burst capacity per account
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Milliseconds to restore one token
    #[serde(default = "default_refill_interval_ms")]
    pub refill_interval_ms: u64,

    /// Seconds between idle bucket sweeps
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

fn default_capacity() -> u32 {
    10
}

fn default_refill_interval_ms() -> u64 {
    6_000
}

fn default_prune_interval_secs() -> u64 {
    300
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_interval_ms: default_refill_interval_ms(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Interval between idle bucket sweeps.
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}

/// Authenticator cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Seconds a resolved account may be served from cache. Zero disables caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Upper bound on cached accounts
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_cache_max_entries() -> usize {
    10_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl AuthConfig {
    /// Cache configuration for the authenticator.
    pub fn cache_config(&self) -> TtlCacheConfig {
        TtlCacheConfig::default()
            .with_ttl_secs(self.cache_ttl_secs)
            .with_max_size(self.cache_max_entries)
    }
}

/// How the metering service serializes quota checks against increments.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotaPolicy {
    /// Increment first and roll back on overflow; usage never exceeds quota
    #[default]
    Reserve,
    /// Check, render, then increment; concurrent requests may overshoot slightly
    CheckThenIncrement,
}

/// Usage accounting settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsageConfig {
    /// Days a period counter survives after its last increment
    #[serde(default = "default_counter_ttl_days")]
    pub counter_ttl_days: u64,

    /// Quota enforcement strategy
    #[serde(default)]
    pub quota_policy: QuotaPolicy,

    /// Link reported with `QuotaExceeded`
    #[serde(default = "default_upgrade_url")]
    pub upgrade_url: String,
}

/// Shortest counter lifetime that outlives the longest billing period.
pub const MIN_COUNTER_TTL_DAYS: u64 = 32;

fn default_counter_ttl_days() -> u64 {
    MIN_COUNTER_TTL_DAYS
}

fn default_upgrade_url() -> String {
    "https://qrapi.dev/upgrade".to_string()
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            counter_ttl_days: default_counter_ttl_days(),
            quota_policy: QuotaPolicy::default(),
            upgrade_url: default_upgrade_url(),
        }
    }
}

impl UsageConfig {
    /// Counter time-to-live.
    pub fn counter_ttl(&self) -> Duration {
        Duration::from_secs(self.counter_ttl_days.saturating_mul(24 * 60 * 60))
    }
}

/// Quota and features of one plan tier.
///
/// ```toml
/// [plans.pro]
/// quota = 10_000
/// features = ["custom_colors"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlanConfig {
    /// Generations allowed per billing period
    pub quota: u64,

    /// Enabled premium features
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Which billing provider to use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BillingProviderKind {
    /// Offline provider issuing local references
    #[default]
    Noop,
    /// Stripe customers API; needs `STRIPE_SECRET_KEY`
    Stripe,
}

/// Billing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BillingConfig {
    /// Provider backend
    #[serde(default)]
    pub provider: BillingProviderKind,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Top-level qrgate configuration.
///
/// # Example
///
/// ```no_run
/// use qrgate_rate_limit::QrGateConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = QrGateConfig::load()?;
/// println!("Burst capacity: {}", config.rate_limit.capacity);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct QrGateConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-account admission control
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Authenticator cache
    #[serde(default)]
    pub auth: AuthConfig,

    /// Usage accounting
    #[serde(default)]
    pub usage: UsageConfig,

    /// Plan overrides keyed by tier name
    #[serde(default)]
    pub plans: HashMap<String, PlanConfig>,

    /// Billing provider
    #[serde(default)]
    pub billing: BillingConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QrGateConfig {
    /// Load configuration from a specific file path.
    ///
    /// Sections missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> QrGateResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                QrGateError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                QrGateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> QrGateResult<Self> {
        Self::load_with(None)
    }

    /// Like [`load`](Self::load), but with an explicit file in place of the
    /// home and current-directory lookups.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> QrGateResult<Self> {
        debug!("Loading configuration with precedence: env > user file > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                if let Some(home) = dirs::home_dir() {
                    let home_config = home.join(".config/qrgate/qrgate.toml");
                    builder = builder.add_source(File::from(home_config).required(false));
                }
                builder = builder.add_source(File::with_name("qrgate").required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("QRGATE")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .map_err(|e| {
                QrGateError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                QrGateError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Build the plan catalog, applying any `[plans.*]` overrides.
    pub fn plan_catalog(&self) -> Result<PlanCatalog, ConfigError> {
        PlanCatalog::standard().with_overrides(&self.plans)
    }

    /// Check every derived setting, returning the first problem found.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.plan_catalog()?;
        crate::RatePolicy::from_config(&self.rate_limit)?;
        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| ConfigError::new(format!("Invalid bind address '{}': {}", self.server.bind, e)))?;
        if self.rate_limit.prune_interval_secs == 0 {
            return Err(ConfigError::new("rate_limit.prune_interval_secs must be positive"));
        }
        if self.usage.counter_ttl_days < MIN_COUNTER_TTL_DAYS {
            return Err(ConfigError::new(format!(
                "usage.counter_ttl_days must be at least {}, got {}",
                MIN_COUNTER_TTL_DAYS, self.usage.counter_ttl_days
            )));
        }
        debug!("Configuration is valid");
        Ok(())
    }
}
