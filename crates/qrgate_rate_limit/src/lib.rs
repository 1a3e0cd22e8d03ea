//! Entitlement policy for qrgate.
//!
//! This crate holds the static side of the metering engine:
//! - [`PlanCatalog`] maps plan tiers to monthly quotas and feature sets
//! - [`AdmissionRegistry`] keeps one token bucket per account
//! - [`QrGateConfig`] loads layered TOML configuration
//!
//! ## Configuration precedence
//!
//! Later sources override earlier ones:
//! 1. Bundled defaults (`qrgate.toml` shipped with the crate)
//! 2. `~/.config/qrgate/qrgate.toml`
//! 3. `./qrgate.toml`
//! 4. `QRGATE__<SECTION>__<KEY>` environment variables

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod plans;
mod registry;

pub use config::{
    AuthConfig, BillingConfig, BillingProviderKind, LoggingConfig, MIN_COUNTER_TTL_DAYS,
    PlanConfig, QrGateConfig, QuotaPolicy, RateLimitConfig, ServerConfig, UsageConfig,
};
pub use plans::{Plan, PlanCatalog};
pub use registry::{Admission, AdmissionRegistry, RatePolicy};
