//! Tests for layered configuration and the plan catalog.

use qrgate_core::{Feature, PlanTier};
use qrgate_rate_limit::{
    BillingProviderKind, MIN_COUNTER_TTL_DAYS, PlanCatalog, PlanConfig, QrGateConfig, QuotaPolicy,
};
use std::collections::HashMap;
use std::io::Write;
use tempfile::Builder;

#[test]
fn test_load_bundled_defaults() {
    let config = QrGateConfig::load().unwrap();

    assert_eq!(config.rate_limit.capacity, 10);
    assert_eq!(config.rate_limit.refill_interval_ms, 6_000);
    assert_eq!(config.usage.counter_ttl_days, 32);
    assert_eq!(config.usage.quota_policy, QuotaPolicy::Reserve);
    assert_eq!(config.billing.provider, BillingProviderKind::Noop);
    assert_eq!(config.plans["free"].quota, 100);
    assert_eq!(config.plans["business"].features, vec![Feature::CustomColors]);
    config.validate().unwrap();
}

#[test]
fn test_config_from_file_fills_missing_sections() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        temp_file,
        r#"
[rate_limit]
capacity = 3

[usage]
quota_policy = "check_then_increment"

[plans.starter]
quota = 5_000
"#
    )
    .unwrap();

    let config = QrGateConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.rate_limit.capacity, 3);
    assert_eq!(config.rate_limit.refill_interval_ms, 6_000);
    assert_eq!(config.usage.quota_policy, QuotaPolicy::CheckThenIncrement);
    assert_eq!(config.usage.upgrade_url, "https://qrapi.dev/upgrade");
    assert_eq!(config.server.bind, "0.0.0.0:8080");

    let catalog = config.plan_catalog().unwrap();
    assert_eq!(*catalog.get(PlanTier::Starter).quota(), 5_000);
    assert_eq!(*catalog.get(PlanTier::Free).quota(), 100);
}

#[test]
fn test_explicit_file_layers_over_bundled_defaults() {
    let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(temp_file, "[logging]\njson = true").unwrap();

    let config = QrGateConfig::load_with(Some(temp_file.path())).unwrap();
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.plans.len(), 4);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = QrGateConfig::load_with(Some(std::path::Path::new("/nonexistent/qrgate.toml")));
    assert!(result.is_err());
}

#[test]
fn test_unknown_tier_override_is_rejected() {
    let mut overrides = HashMap::new();
    overrides.insert(
        "gold".to_string(),
        PlanConfig {
            quota: 1,
            features: vec![],
        },
    );
    let err = PlanCatalog::standard().with_overrides(&overrides).unwrap_err();
    assert!(err.message.contains("gold"));
}

#[test]
fn test_zero_capacity_fails_validation() {
    let mut config = QrGateConfig::default();
    config.rate_limit.capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_prune_interval_fails_validation() {
    let mut config = QrGateConfig::default();
    config.rate_limit.prune_interval_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("prune_interval_secs"));
}

#[test]
fn test_counter_ttl_must_outlive_a_billing_period() {
    let mut config = QrGateConfig::default();
    for days in [0, 1, 31] {
        config.usage.counter_ttl_days = days;
        assert!(config.validate().is_err(), "{} days should be rejected", days);
    }
    config.usage.counter_ttl_days = MIN_COUNTER_TTL_DAYS;
    config.validate().unwrap();
}

#[test]
fn test_huge_counter_ttl_saturates() {
    let mut config = QrGateConfig::default();
    config.usage.counter_ttl_days = u64::MAX;
    config.validate().unwrap();
    assert_eq!(config.usage.counter_ttl().as_secs(), u64::MAX);
}

#[test]
fn test_standard_catalog_matches_published_pricing() {
    let catalog = PlanCatalog::standard();
    let quotas: Vec<u64> = catalog.iter().map(|plan| *plan.quota()).collect();
    assert_eq!(quotas, vec![100, 2_500, 10_000, 100_000]);

    assert!(!catalog.get(PlanTier::Free).allows(Feature::CustomColors));
    assert!(!catalog.get(PlanTier::Starter).allows(Feature::CustomColors));
    assert!(catalog.get(PlanTier::Pro).allows(Feature::CustomColors));
    assert!(catalog.get(PlanTier::Business).allows(Feature::CustomColors));
}
