//! Billing capability error types.

/// Error kinds for billing provider calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum BillingErrorKind {
    /// Transport failure talking to the provider
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// Provider answered with an error
    #[display("API error: {}", _0)]
    Api(String),

    /// Missing or invalid provider configuration
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

/// Billing error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Billing Error: {} at line {} in {}", kind, line, file)]
pub struct BillingError {
    /// The error kind
    pub kind: BillingErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl BillingError {
    /// Create a new BillingError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BillingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
