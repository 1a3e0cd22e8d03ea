//! Wall-clock source for billing periods and analytics.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The system clock.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}
