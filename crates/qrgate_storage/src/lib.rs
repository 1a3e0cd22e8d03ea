//! In-memory backends for qrgate.
//!
//! These implement the persistence and counter store capabilities with
//! process-local state. They back single-node deployments without a database
//! and serve as deterministic test doubles: every mutation happens under one
//! lock, so increments are atomic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accounts;
mod artifacts;
mod counters;

pub use accounts::InMemoryAccountRepository;
pub use artifacts::InMemoryArtifactRepository;
pub use counters::InMemoryUsageCounterStore;
