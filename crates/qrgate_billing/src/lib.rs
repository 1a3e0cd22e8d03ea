//! Billing capability adapters for qrgate.
//!
//! - [`StripeBilling`] creates customers through the Stripe REST API
//! - [`NoopBilling`] issues local references without contacting anyone

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod noop;
mod stripe;

pub use noop::NoopBilling;
pub use stripe::StripeBilling;
