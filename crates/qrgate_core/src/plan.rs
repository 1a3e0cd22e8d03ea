//! Plan tiers and the premium features they unlock.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Subscription tier of an account.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlanTier {
    /// Free tier
    #[default]
    Free,
    /// Entry paid tier
    Starter,
    /// Professional tier
    Pro,
    /// Highest tier
    Business,
}

/// Premium rendering capability gated by plan tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    /// Caller-chosen foreground and background colors
    CustomColors,
}

impl Feature {
    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Closed set of enabled features.
///
/// # Examples
///
/// ```
/// use qrgate_core::{Feature, FeatureSet};
///
/// let features = FeatureSet::empty().with(Feature::CustomColors);
/// assert!(features.contains(Feature::CustomColors));
/// assert!(!FeatureSet::empty().contains(Feature::CustomColors));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet(u32);

impl FeatureSet {
    /// No features enabled.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// This set plus `feature`.
    pub const fn with(self, feature: Feature) -> Self {
        Self(self.0 | feature.bit())
    }

    /// Whether `feature` is enabled.
    pub const fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    /// Enabled features in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::iter().filter(move |feature| self.contains(*feature))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
