//! Shared application state.

use qrgate_core::ArtifactId;
use qrgate_metering::Gateway;
use std::sync::Arc;

/// State handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    gateway: Arc<Gateway>,
    base_url: Arc<str>,
}

impl AppState {
    /// Wrap a gateway; `base_url` prefixes the links returned to callers.
    pub fn new(gateway: Gateway, base_url: &str) -> Self {
        Self {
            gateway: Arc::new(gateway),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// The gateway behind this server.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Public link to view an artifact.
    pub fn qr_url(&self, id: &ArtifactId) -> String {
        format!("{}/qr/{}", self.base_url, id)
    }

    /// Public link to an artifact's analytics.
    pub fn analytics_url(&self, id: &ArtifactId) -> String {
        format!("{}/analytics/{}", self.base_url, id)
    }
}
