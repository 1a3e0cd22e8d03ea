//! Artifact view and scan analytics.

use crate::{Clock, system_clock};
use qrgate_core::{Analytics, ArtifactId, ArtifactView};
use qrgate_error::{GatewayError, GatewayErrorKind, GatewayResult, StoreErrorKind};
use qrgate_interface::ArtifactRepository;
use std::sync::Arc;
use tracing::{debug, instrument};

fn not_found() -> GatewayError {
    GatewayError::new(GatewayErrorKind::NotFound("QR code".to_string()))
}

/// Unmetered reads of generated artifacts.
pub struct ArtifactService {
    artifacts: Arc<dyn ArtifactRepository>,
    clock: Clock,
}

impl ArtifactService {
    /// Create a service using the system clock.
    pub fn new(artifacts: Arc<dyn ArtifactRepository>) -> Self {
        Self {
            artifacts,
            clock: system_clock(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Count a scan and return what the viewer should receive.
    ///
    /// The increment and the payload read are one store operation, so
    /// concurrent views are each counted exactly once.
    #[instrument(skip(self, id), fields(artifact_id = %id))]
    pub async fn view(&self, id: &ArtifactId) -> GatewayResult<ArtifactView> {
        let artifact = self.artifacts.record_scan(id).await.map_err(|e| match e.kind() {
            StoreErrorKind::NotFound => not_found(),
            _ => GatewayError::from(e),
        })?;
        debug!(scans = artifact.scans(), "Viewed artifact");
        Ok(artifact.view())
    }

    /// Scan statistics without counting a scan.
    #[instrument(skip(self, id), fields(artifact_id = %id))]
    pub async fn analytics(&self, id: &ArtifactId) -> GatewayResult<Analytics> {
        let artifact = self.artifacts.get(id).await?.ok_or_else(not_found)?;
        Ok(artifact.analytics((self.clock)()))
    }
}

impl std::fmt::Debug for ArtifactService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactService").finish_non_exhaustive()
    }
}
