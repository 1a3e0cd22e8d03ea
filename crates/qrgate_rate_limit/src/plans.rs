//! Plan catalog: tier → monthly quota and enabled features.

use crate::PlanConfig;
use qrgate_core::{Feature, FeatureSet, PlanTier};
use qrgate_error::ConfigError;
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::debug;

/// Entitlements of one plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct Plan {
    tier: PlanTier,
    quota: u64,
    features: FeatureSet,
}

impl Plan {
    /// A plan with the given entitlements.
    pub fn new(tier: PlanTier, quota: u64, features: FeatureSet) -> Self {
        Self {
            tier,
            quota,
            features,
        }
    }

    /// Whether this plan enables `feature`.
    pub fn allows(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }
}

/// Read-only table of every plan tier.
///
/// Every [`PlanTier`] always has an entry, so lookups cannot fail.
///
/// # Example
///
/// ```
/// use qrgate_core::{Feature, PlanTier};
/// use qrgate_rate_limit::PlanCatalog;
///
/// let catalog = PlanCatalog::standard();
/// assert_eq!(*catalog.get(PlanTier::Free).quota(), 100);
/// assert!(catalog.get(PlanTier::Pro).allows(Feature::CustomColors));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: [Plan; 4],
}

fn slot(tier: PlanTier) -> usize {
    match tier {
        PlanTier::Free => 0,
        PlanTier::Starter => 1,
        PlanTier::Pro => 2,
        PlanTier::Business => 3,
    }
}

impl PlanCatalog {
    /// The published plans.
    pub fn standard() -> Self {
        let colors = FeatureSet::empty().with(Feature::CustomColors);
        Self {
            plans: [
                Plan::new(PlanTier::Free, 100, FeatureSet::empty()),
                Plan::new(PlanTier::Starter, 2_500, FeatureSet::empty()),
                Plan::new(PlanTier::Pro, 10_000, colors),
                Plan::new(PlanTier::Business, 100_000, colors),
            ],
        }
    }

    /// Replace tiers named in `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error for tier names that are not a [`PlanTier`].
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, PlanConfig>,
    ) -> Result<Self, ConfigError> {
        for (name, plan) in overrides {
            let tier = PlanTier::from_str(name)
                .map_err(|_| ConfigError::new(format!("Unknown plan tier '{}'", name)))?;
            debug!(%tier, quota = plan.quota, "Applying plan override");
            self.plans[slot(tier)] = Plan::new(tier, plan.quota, plan.features.iter().copied().collect());
        }
        Ok(self)
    }

    /// Entitlements for `tier`.
    pub fn get(&self, tier: PlanTier) -> &Plan {
        &self.plans[slot(tier)]
    }

    /// Plans from the lowest tier to the highest.
    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        PlanTier::iter().map(|tier| self.get(tier))
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
