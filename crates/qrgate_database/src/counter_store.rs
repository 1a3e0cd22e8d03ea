//! UsageCounterStore backed by the usage_counters table.
//!
//! Every operation is a single statement, so PostgreSQL row locking provides
//! the atomicity concurrent requests rely on. Expired rows behave as absent and
//! are reset by the next increment.

use crate::connection::{DbPool, with_connection};
use crate::models::{CountRow, count_from_row};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Double, Text};
use qrgate_core::UsageKey;
use qrgate_error::StoreResult;
use qrgate_interface::UsageCounterStore;
use std::time::Duration;
use tracing::{debug, instrument};

const GET_SQL: &str = "SELECT count FROM usage_counters \
     WHERE counter_key = $1 AND (expires_at IS NULL OR expires_at > now())";

const INCREMENT_SQL: &str = "INSERT INTO usage_counters (counter_key, count) VALUES ($1, 1) \
     ON CONFLICT (counter_key) DO UPDATE SET \
         count = CASE WHEN usage_counters.expires_at <= now() THEN 1 \
                      ELSE usage_counters.count + 1 END, \
         expires_at = CASE WHEN usage_counters.expires_at <= now() THEN NULL \
                           ELSE usage_counters.expires_at END \
     RETURNING count";

const DECREMENT_SQL: &str = "UPDATE usage_counters SET count = GREATEST(count - 1, 0) \
     WHERE counter_key = $1 AND (expires_at IS NULL OR expires_at > now()) \
     RETURNING count";

const EXPIRE_SQL: &str = "UPDATE usage_counters \
     SET expires_at = now() + make_interval(secs => $2) \
     WHERE counter_key = $1";

const PURGE_SQL: &str = "DELETE FROM usage_counters WHERE expires_at <= now()";

/// Database-backed usage counters.
#[derive(Clone)]
pub struct PostgresUsageCounterStore {
    pool: DbPool,
}

impl PostgresUsageCounterStore {
    /// Create a new counter store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageCounterStore for PostgresUsageCounterStore {
    async fn get(&self, key: &UsageKey) -> StoreResult<Option<u64>> {
        let key = key.to_string();
        let row = with_connection(&self.pool, move |conn| {
            diesel::sql_query(GET_SQL)
                .bind::<Text, _>(key)
                .get_result::<CountRow>(conn)
                .optional()
                .map_err(Into::into)
        })
        .await?;
        Ok(row.map(|row| count_from_row(row.count)))
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn increment(&self, key: &UsageKey) -> StoreResult<u64> {
        let key = key.to_string();
        let row = with_connection(&self.pool, move |conn| {
            diesel::sql_query(INCREMENT_SQL)
                .bind::<Text, _>(key)
                .get_result::<CountRow>(conn)
                .map_err(Into::into)
        })
        .await?;
        debug!(count = row.count, "Incremented counter");
        Ok(count_from_row(row.count))
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn decrement(&self, key: &UsageKey) -> StoreResult<u64> {
        let key = key.to_string();
        let row = with_connection(&self.pool, move |conn| {
            diesel::sql_query(DECREMENT_SQL)
                .bind::<Text, _>(key)
                .get_result::<CountRow>(conn)
                .optional()
                .map_err(Into::into)
        })
        .await?;
        Ok(row.map_or(0, |row| count_from_row(row.count)))
    }

    async fn set_expiry(&self, key: &UsageKey, ttl: Duration) -> StoreResult<()> {
        let key = key.to_string();
        let secs = ttl.as_secs_f64();
        with_connection(&self.pool, move |conn| {
            diesel::sql_query(EXPIRE_SQL)
                .bind::<Text, _>(key)
                .bind::<Double, _>(secs)
                .execute(conn)
                .map(|_| ())
                .map_err(Into::into)
        })
        .await
    }

    /// Delete rows whose expiry has passed.
    #[instrument(skip(self))]
    async fn purge_expired(&self) -> StoreResult<usize> {
        let removed = with_connection(&self.pool, |conn| {
            diesel::sql_query(PURGE_SQL).execute(conn).map_err(Into::into)
        })
        .await?;
        debug!(removed, "Purged expired counters");
        Ok(removed)
    }
}
