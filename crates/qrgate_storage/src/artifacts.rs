//! In-memory artifact repository.

use async_trait::async_trait;
use chrono::Utc;
use qrgate_core::{Artifact, ArtifactId, NewArtifact};
use qrgate_error::{StoreError, StoreErrorKind, StoreResult};
use qrgate_interface::ArtifactRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Artifacts stored in a HashMap keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactRepository {
    artifacts: Arc<RwLock<HashMap<ArtifactId, Artifact>>>,
}

impl InMemoryArtifactRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    /// Whether no artifact is stored.
    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifactRepository {
    #[instrument(skip_all, fields(artifact_id = %artifact.id, account_id = %artifact.account_id))]
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact> {
        let mut artifacts = self.artifacts.write().await;
        if artifacts.contains_key(&artifact.id) {
            return Err(StoreError::new(StoreErrorKind::Conflict(format!(
                "artifact {} already exists",
                artifact.id
            ))));
        }
        let stored = Artifact::new(
            artifact.id.clone(),
            artifact.account_id,
            artifact.payload,
            0,
            Utc::now(),
        );
        artifacts.insert(artifact.id, stored.clone());
        debug!("Stored artifact");
        Ok(stored)
    }

    #[instrument(skip(self, id), fields(artifact_id = %id))]
    async fn record_scan(&self, id: &ArtifactId) -> StoreResult<Artifact> {
        let mut artifacts = self.artifacts.write().await;
        let artifact = artifacts
            .get_mut(id)
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound))?;
        *artifact = Artifact::new(
            artifact.id().clone(),
            *artifact.account_id(),
            artifact.payload().clone(),
            artifact.scans() + 1,
            *artifact.created_at(),
        );
        debug!(scans = artifact.scans(), "Recorded scan");
        Ok(artifact.clone())
    }

    async fn get(&self, id: &ArtifactId) -> StoreResult<Option<Artifact>> {
        Ok(self.artifacts.read().await.get(id).cloned())
    }
}
