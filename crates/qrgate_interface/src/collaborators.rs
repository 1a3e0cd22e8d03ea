//! External capabilities the gateway delegates to.

use async_trait::async_trait;
use qrgate_core::RenderSpec;
use qrgate_error::{BillingError, RenderError};

/// Turns a sanitized render spec into encoded image bytes.
///
/// Rendering is CPU-bound and stateless; async callers should run it on a
/// blocking thread.
pub trait QrRenderer: Send + Sync {
    /// Encode `spec.payload()` as a QR code image.
    fn render(&self, spec: &RenderSpec) -> Result<Vec<u8>, RenderError>;
}

/// Payment provider customer management.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a customer and return the provider's opaque reference.
    async fn create_customer(&self) -> Result<String, BillingError>;

    /// Provider name for logs.
    fn provider_name(&self) -> &'static str;
}
