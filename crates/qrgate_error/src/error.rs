//! Top-level error wrapper types.

use crate::{BillingError, ConfigError, GatewayError, RenderError, StoreError};

/// Every failure the qrgate workspace can produce.
///
/// # Examples
///
/// ```
/// use qrgate_error::{QrGateError, ConfigError};
///
/// let err: QrGateError = ConfigError::new("Missing field").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum QrGateErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Persistence or counter store error
    #[from(StoreError)]
    Store(StoreError),
    /// Caller-facing gateway error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Rendering capability error
    #[from(RenderError)]
    Render(RenderError),
    /// Billing capability error
    #[from(BillingError)]
    Billing(BillingError),
}

/// qrgate error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("qrgate Error: {}", _0)]
pub struct QrGateError(Box<QrGateErrorKind>);

impl QrGateError {
    /// Create a new error from a kind.
    pub fn new(kind: QrGateErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QrGateErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to QrGateErrorKind
impl<T> From<T> for QrGateError
where
    T: Into<QrGateErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for qrgate bootstrapping operations.
pub type QrGateResult<T> = std::result::Result<T, QrGateError>;
