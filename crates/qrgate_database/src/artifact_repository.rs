//! ArtifactRepository backed by PostgreSQL.

use crate::connection::{DbPool, with_connection};
use crate::models::{ArtifactRow, NewArtifactRow};
use crate::schema::artifacts;
use async_trait::async_trait;
use diesel::prelude::*;
use qrgate_core::{Artifact, ArtifactId, NewArtifact};
use qrgate_error::StoreResult;
use qrgate_interface::ArtifactRepository;
use tracing::{debug, instrument};

/// Database-backed artifact repository.
#[derive(Clone)]
pub struct PostgresArtifactRepository {
    pool: DbPool,
}

impl PostgresArtifactRepository {
    /// Create a new artifact repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactRepository for PostgresArtifactRepository {
    #[instrument(skip_all, fields(artifact_id = %artifact.id))]
    async fn create(&self, artifact: NewArtifact) -> StoreResult<Artifact> {
        let row = NewArtifactRow::from(artifact);
        let created = with_connection(&self.pool, move |conn| {
            diesel::insert_into(artifacts::table)
                .values(&row)
                .returning(ArtifactRow::as_returning())
                .get_result(conn)
                .map_err(Into::into)
        })
        .await?;
        debug!("Inserted artifact");
        Ok(created.into())
    }

    /// One `UPDATE ... RETURNING` statement, so the increment and the read
    /// cannot interleave with other viewers.
    #[instrument(skip(self, id), fields(artifact_id = %id))]
    async fn record_scan(&self, id: &ArtifactId) -> StoreResult<Artifact> {
        let id = id.as_str().to_string();
        let row = with_connection(&self.pool, move |conn| {
            diesel::update(artifacts::table.find(id))
                .set(artifacts::scans.eq(artifacts::scans + 1))
                .returning(ArtifactRow::as_returning())
                .get_result(conn)
                .map_err(Into::into)
        })
        .await?;
        debug!(scans = row.scans, "Recorded scan");
        Ok(row.into())
    }

    async fn get(&self, id: &ArtifactId) -> StoreResult<Option<Artifact>> {
        let id = id.as_str().to_string();
        let row = with_connection(&self.pool, move |conn| {
            artifacts::table
                .find(id)
                .select(ArtifactRow::as_select())
                .first(conn)
                .optional()
                .map_err(Into::into)
        })
        .await?;
        Ok(row.map(Artifact::from))
    }
}
