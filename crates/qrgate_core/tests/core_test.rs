//! Tests for the shared qrgate data model.

use chrono::{Duration, TimeZone, Utc};
use qrgate_core::{
    AccountId, ApiKey, Artifact, ArtifactId, ArtifactView, BillingPeriod, Color, Feature,
    FeatureSet, ImageFormat, PlanTier, RenderRequest, RenderSpec, UsageKey, UsageReport,
};

#[test]
fn free_tier_colors_are_ignored_not_rejected() {
    let plain = RenderRequest::new("https://example.com");
    let mut colored = plain.clone();
    colored.color = Some("#FF0000".to_string());
    colored.bg_color = Some("#00FF00".to_string());

    let plain_spec = RenderSpec::sanitize(&plain, FeatureSet::empty()).unwrap();
    let colored_spec = RenderSpec::sanitize(&colored, FeatureSet::empty()).unwrap();
    assert_eq!(plain_spec, colored_spec);
}

#[test]
fn custom_colors_apply_when_enabled() {
    let mut request = RenderRequest::new("hello");
    request.color = Some("#FF0000".to_string());
    request.format = Some("jpeg".to_string());
    request.size = Some(512);

    let features = FeatureSet::empty().with(Feature::CustomColors);
    let spec = RenderSpec::sanitize(&request, features).unwrap();
    assert_eq!(*spec.foreground(), Color { r: 0xFF, g: 0, b: 0 });
    assert_eq!(*spec.background(), Color::WHITE);
    assert_eq!(*spec.format(), ImageFormat::Jpeg);
    assert_eq!(*spec.size(), 512);
}

#[test]
fn empty_option_strings_count_as_absent() {
    let request: RenderRequest =
        serde_json::from_str(r#"{"data":"x","format":"","color":""}"#).unwrap();
    let features = FeatureSet::empty().with(Feature::CustomColors);
    let spec = RenderSpec::sanitize(&request, features).unwrap();
    assert_eq!(*spec.format(), ImageFormat::Png);
    assert_eq!(*spec.foreground(), Color::BLACK);
}

#[test]
fn plan_tier_round_trips_through_json() {
    let json = serde_json::to_string(&PlanTier::Business).unwrap();
    assert_eq!(json, "\"business\"");
    assert_eq!(serde_json::from_str::<PlanTier>("\"pro\"").unwrap(), PlanTier::Pro);
}

#[test]
fn view_after_creation_redirects_web_payloads() {
    let artifact = Artifact::new(
        ArtifactId::from("abc123"),
        AccountId::new(7),
        "https://example.com".to_string(),
        1,
        Utc::now(),
    );
    assert_eq!(
        artifact.view(),
        ArtifactView::Redirect("https://example.com".to_string())
    );
}

#[test]
fn analytics_at_creation_instant_is_zero() {
    let now = Utc::now();
    let artifact = Artifact::new(
        ArtifactId::generate(),
        AccountId::new(1),
        "text".to_string(),
        9,
        now,
    );
    let stats = artifact.analytics(now);
    assert_eq!(stats.avg_scans_per_day, 0.0);
    assert!(!stats.avg_scans_per_day.is_nan());
}

#[test]
fn analytics_averages_over_elapsed_days() {
    let created = Utc::now();
    let artifact = Artifact::new(
        ArtifactId::generate(),
        AccountId::new(1),
        "text".to_string(),
        30,
        created,
    );
    let stats = artifact.analytics(created + Duration::days(3));
    assert!((stats.avg_scans_per_day - 10.0).abs() < f64::EPSILON);
}

#[test]
fn usage_keys_are_per_account_and_period() {
    let june = BillingPeriod::containing(Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap());
    let july = BillingPeriod::containing(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
    assert_ne!(june, july);
    assert_ne!(
        UsageKey::new(AccountId::new(1), june),
        UsageKey::new(AccountId::new(1), july)
    );
    assert_eq!(UsageKey::new(AccountId::new(1), july).to_string(), "usage:1:2025-07");
}

#[test]
fn usage_report_serializes_wire_fields() {
    let period = BillingPeriod::containing(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
    let report = UsageReport::new(PlanTier::Starter, 40, 2_500, period);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["plan"], "starter");
    assert_eq!(value["remaining"], 2_460);
    assert!(value["reset_date"].as_str().unwrap().starts_with("2025-02-01T00:00:00"));
}

#[test]
fn api_keys_debug_never_leak() {
    let key = ApiKey::generate();
    assert!(!format!("{:?}", key).contains(&key.as_str()[10..]));
}
