//! Background maintenance tasks.

use qrgate_interface::UsageCounterStore;
use qrgate_rate_limit::AdmissionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One maintenance pass: drop rate-limit buckets that have fully refilled and
/// delete usage counters past their expiry.
///
/// Full buckets carry no state, so pruning them never changes admission.
pub async fn run_housekeeping(admission: &AdmissionRegistry, counters: &dyn UsageCounterStore) {
    let buckets = admission.prune();
    match counters.purge_expired().await {
        Ok(purged) => debug!(buckets, purged, "Housekeeping complete"),
        Err(e) => warn!(error = %e, "Failed to purge expired usage counters"),
    }
}

/// Run [`run_housekeeping`] every `every`.
///
/// `every` must be non-zero; configuration validation guarantees this for
/// `rate_limit.prune_interval_secs`.
pub fn spawn_housekeeping(
    admission: Arc<AdmissionRegistry>,
    counters: Arc<dyn UsageCounterStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            run_housekeeping(&admission, counters.as_ref()).await;
        }
    })
}
