//! Generated artifacts and their scan analytics.

use crate::AccountId;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Public identifier of a rendered artifact: 16 lowercase hex characters.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ArtifactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Fields of an artifact at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    /// Identifier chosen by the gateway
    pub id: ArtifactId,
    /// Owning account
    pub account_id: AccountId,
    /// Encoded payload
    pub payload: String,
}

/// A persisted artifact with its scan counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Artifact {
    id: ArtifactId,
    account_id: AccountId,
    payload: String,
    scans: u64,
    created_at: DateTime<Utc>,
}

impl Artifact {
    /// Assemble an artifact record read from persistence.
    pub fn new(
        id: ArtifactId,
        account_id: AccountId,
        payload: String,
        scans: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            payload,
            scans,
            created_at,
        }
    }

    /// What a viewer should receive for this artifact.
    pub fn view(&self) -> ArtifactView {
        ArtifactView::for_payload(&self.payload)
    }

    /// Scan statistics as of `now`.
    pub fn analytics(&self, now: DateTime<Utc>) -> Analytics {
        Analytics {
            qr_id: self.id.clone(),
            total_scans: self.scans,
            created_at: self.created_at,
            avg_scans_per_day: scans_per_day(self.scans, self.created_at, now),
        }
    }
}

/// Result of viewing an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactView {
    /// The payload is a web address; send the viewer there
    Redirect(String),
    /// Return the payload as-is
    Payload(String),
}

impl ArtifactView {
    /// Classify a payload by its scheme prefix.
    pub fn for_payload(payload: &str) -> Self {
        let lower = payload
            .get(..8)
            .unwrap_or(payload)
            .to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Redirect(payload.to_string())
        } else {
            Self::Payload(payload.to_string())
        }
    }
}

/// Scan statistics for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Artifact identifier
    pub qr_id: ArtifactId,
    /// Total views recorded
    pub total_scans: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// `scans / elapsed_hours * 24`, or 0 when no time has elapsed
    pub avg_scans_per_day: f64,
}

/// Average scans per day between `created_at` and `now`.
///
/// Returns 0 when the elapsed time is zero or negative.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use qrgate_core::scans_per_day;
///
/// let now = Utc::now();
/// assert_eq!(scans_per_day(5, now, now), 0.0);
/// assert_eq!(scans_per_day(10, now - Duration::hours(48), now), 5.0);
/// ```
pub fn scans_per_day(scans: u64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_hours = (now - created_at).num_milliseconds() as f64 / 3_600_000.0;
    if !elapsed_hours.is_finite() || elapsed_hours <= 0.0 {
        return 0.0;
    }
    scans as f64 / elapsed_hours * 24.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn generated_ids_are_sixteen_hex_chars() {
        let id = ArtifactId::generate();
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn web_payloads_redirect() {
        assert_eq!(
            ArtifactView::for_payload("HTTPS://Example.com"),
            ArtifactView::Redirect("HTTPS://Example.com".to_string())
        );
        assert_eq!(
            ArtifactView::for_payload("http://a"),
            ArtifactView::Redirect("http://a".to_string())
        );
    }

    #[test]
    fn other_payloads_are_returned() {
        for payload in ["hello", "httpx://nope", "ftp://host", "", "héllo wörld"] {
            assert_eq!(
                ArtifactView::for_payload(payload),
                ArtifactView::Payload(payload.to_string())
            );
        }
    }

    #[test]
    fn clock_skew_yields_zero_rate() {
        let now = Utc::now();
        assert_eq!(scans_per_day(3, now + Duration::minutes(5), now), 0.0);
    }

    #[test]
    fn analytics_reports_counts() {
        let created = Utc::now() - Duration::hours(12);
        let artifact = Artifact::new(
            ArtifactId::from("abc123"),
            AccountId::new(1),
            "hi".to_string(),
            6,
            created,
        );
        let stats = artifact.analytics(created + Duration::hours(12));
        assert_eq!(stats.total_scans, 6);
        assert_eq!(stats.avg_scans_per_day, 12.0);
    }
}
