//! Connection pooling and migrations.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use qrgate_error::{StoreError, StoreErrorKind, StoreResult};
use tracing::{debug, info, instrument};

/// Shared r2d2 pool of PostgreSQL connections.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Read `DATABASE_URL` from the environment.
///
/// # Errors
///
/// Returns an error if the variable is not set.
pub fn database_url() -> StoreResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        StoreError::new(StoreErrorKind::Unavailable(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Build a connection pool for `database_url`.
///
/// # Errors
///
/// Returns an error if no connection can be established.
#[instrument(skip(database_url))]
pub fn establish_pool(database_url: &str) -> StoreResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().build(manager)?;
    debug!(max_size = pool.max_size(), "Database pool ready");
    Ok(pool)
}

/// Apply any migrations that have not run yet.
#[instrument(skip(pool))]
pub fn run_migrations(pool: &DbPool) -> StoreResult<usize> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::new(StoreErrorKind::Query(format!("Migration failed: {}", e))))?;
    info!(count = applied.len(), "Applied migrations");
    Ok(applied.len())
}

/// Run `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn with_connection<T, F>(pool: &DbPool, f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| StoreError::new(StoreErrorKind::Query(e.to_string())))?
}
