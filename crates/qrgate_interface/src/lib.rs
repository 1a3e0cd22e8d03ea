//! Capability traits for the qrgate metered QR code gateway.
//!
//! The metering engine depends only on these traits. Concrete backends live in
//! `qrgate_storage` (in-memory), `qrgate_database` (PostgreSQL),
//! `qrgate_render` and `qrgate_billing`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborators;
mod repository;

pub use collaborators::{BillingProvider, QrRenderer};
pub use repository::{AccountRepository, ArtifactRepository, UsageCounterStore};
