//! PostgreSQL integration for qrgate.
//!
//! This crate provides diesel models, schema definitions, embedded migrations
//! and repository implementations for accounts, artifacts and usage counters.
//!
//! # Example
//!
//! ```rust,ignore
//! use qrgate_database::{PostgresAccountRepository, database_url, establish_pool, run_migrations};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool(&database_url()?)?;
//! run_migrations(&pool)?;
//! let accounts = PostgresAccountRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod account_repository;
mod artifact_repository;
mod connection;
mod counter_store;
mod models;

pub mod schema;

pub use account_repository::PostgresAccountRepository;
pub use artifact_repository::PostgresArtifactRepository;
pub use connection::{DbPool, database_url, establish_pool, run_migrations};
pub use counter_store::PostgresUsageCounterStore;
pub use models::{AccountRow, ArtifactRow, CountRow, NewAccountRow, NewArtifactRow};
