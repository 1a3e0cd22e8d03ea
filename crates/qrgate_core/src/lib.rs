//! Core data types for the qrgate metered QR code gateway.
//!
//! This crate provides the vocabulary shared by every other qrgate crate:
//! accounts and their plan tiers, render requests and their sanitized specs,
//! artifacts with scan analytics, and calendar-month billing periods.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod artifact;
mod period;
mod plan;
mod render;
mod usage;

pub use account::{Account, AccountId, ApiKey, NewAccount};
pub use artifact::{Analytics, Artifact, ArtifactId, ArtifactView, NewArtifact, scans_per_day};
pub use period::{BillingPeriod, UsageKey};
pub use plan::{Feature, FeatureSet, PlanTier};
pub use render::{
    Color, DEFAULT_SIZE, ImageFormat, MAX_SIZE, MIN_SIZE, RenderRequest, RenderSpec,
};
pub use usage::UsageReport;
