//! The qrgate metering and entitlement engine.
//!
//! Per metered request the [`Gateway`] runs, in order:
//! 1. [`Authenticator`] resolves the presented API key to an account
//! 2. [`AdmissionRegistry`](qrgate_rate_limit::AdmissionRegistry) takes a token
//!    from the account's bucket
//! 3. [`MeteringService`] checks the monthly quota, renders, persists the
//!    artifact and records usage
//!
//! [`ArtifactService`] serves the unmetered view and analytics paths.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifacts;
mod authenticator;
mod clock;
mod gateway;
mod metering;

pub use artifacts::ArtifactService;
pub use authenticator::Authenticator;
pub use clock::{Clock, system_clock};
pub use gateway::{Gateway, Registration};
pub use metering::{Generation, MeteringService};
