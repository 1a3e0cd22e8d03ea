//! Errors surfaced to gateway callers.
//!
//! Every variant is terminal for the current request: it is reported to the
//! caller and never retried internally.

use crate::{BillingError, RenderError, StoreError, StoreErrorKind};

/// Caller-facing error conditions of a metered request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GatewayErrorKind {
    /// No credential was presented
    #[display("API key required")]
    Unauthenticated,

    /// The presented credential does not resolve to an account
    #[display("Invalid API key")]
    InvalidCredential,

    /// The account's token bucket is exhausted
    #[display("Rate limit exceeded, retry after {}s", retry_after_secs)]
    RateLimited {
        /// Seconds until a token is available again
        retry_after_secs: u64,
    },

    /// Usage for the current billing period is at or above the plan quota
    #[display("Monthly limit exceeded ({} of {} used)", usage, limit)]
    QuotaExceeded {
        /// Usage recorded for the current period
        usage: u64,
        /// Plan quota for the period
        limit: u64,
        /// Where the caller can upgrade their plan
        upgrade_url: String,
    },

    /// The rendering capability failed
    #[display("Failed to generate QR code: {}", _0)]
    RenderFailed(String),

    /// Unknown artifact or account
    #[display("{} not found", _0)]
    NotFound(String),

    /// Counter store or persistence unreachable
    #[display("Store unavailable: {}", _0)]
    StoreUnavailable(String),

    /// The render request is malformed
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),

    /// The billing capability could not create a customer
    #[display("Failed to create customer: {}", _0)]
    BillingFailed(String),
}

/// Gateway error with location tracking.
///
/// # Examples
///
/// ```
/// use qrgate_error::{GatewayError, GatewayErrorKind};
///
/// let err = GatewayError::new(GatewayErrorKind::Unauthenticated);
/// assert_eq!(err.kind(), &GatewayErrorKind::Unauthenticated);
/// assert!(format!("{}", err).contains("API key required"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    /// The specific error kind
    pub kind: GatewayErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl GatewayError {
    /// Create a new gateway error with location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}

impl From<StoreError> for GatewayError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        match err.kind {
            StoreErrorKind::NotFound => GatewayError::new(GatewayErrorKind::NotFound(
                "Record".to_string(),
            )),
            kind => GatewayError::new(GatewayErrorKind::StoreUnavailable(kind.to_string())),
        }
    }
}

impl From<RenderError> for GatewayError {
    #[track_caller]
    fn from(err: RenderError) -> Self {
        GatewayError::new(GatewayErrorKind::RenderFailed(err.message))
    }
}

impl From<BillingError> for GatewayError {
    #[track_caller]
    fn from(err: BillingError) -> Self {
        GatewayError::new(GatewayErrorKind::BillingFailed(err.kind.to_string()))
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
