//! Usage summaries reported to callers.

use crate::{BillingPeriod, PlanTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current-period usage of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Plan tier in effect
    pub plan: PlanTier,
    /// Generations recorded this period
    pub usage: u64,
    /// Plan quota for the period
    pub limit: u64,
    /// `limit - usage`, never below zero
    pub remaining: u64,
    /// Start of the next billing period
    pub reset_date: Option<DateTime<Utc>>,
}

impl UsageReport {
    /// Summarize `usage` against `limit` for `period`.
    pub fn new(plan: PlanTier, usage: u64, limit: u64, period: BillingPeriod) -> Self {
        Self {
            plan,
            usage,
            limit,
            remaining: limit.saturating_sub(usage),
            reset_date: period.resets_at(),
        }
    }
}
