//! Error types for the qrgate workspace.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! [`GatewayError`] is the taxonomy surfaced to API callers. The remaining
//! errors describe failures of the collaborators the gateway depends on.
//!
//! # Examples
//!
//! ```
//! use qrgate_error::{GatewayError, GatewayErrorKind, StoreError, StoreErrorKind};
//!
//! let outage = StoreError::new(StoreErrorKind::Unavailable("connection refused".into()));
//! let err: GatewayError = outage.into();
//! assert!(matches!(err.kind(), GatewayErrorKind::StoreUnavailable(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod billing;
mod config;
mod error;
mod gateway;
mod render;
mod store;

pub use billing::{BillingError, BillingErrorKind};
pub use config::ConfigError;
pub use error::{QrGateError, QrGateErrorKind, QrGateResult};
pub use gateway::{GatewayError, GatewayErrorKind, GatewayResult};
pub use render::RenderError;
pub use store::{StoreError, StoreErrorKind, StoreResult};
