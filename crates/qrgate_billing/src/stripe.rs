//! Stripe customers API client.

use async_trait::async_trait;
use qrgate_error::{BillingError, BillingErrorKind};
use qrgate_interface::BillingProvider;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

const STRIPE_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Stripe billing provider.
#[derive(Clone)]
pub struct StripeBilling {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for StripeBilling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeBilling")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeBilling {
    /// Creates a new Stripe client.
    pub fn new(secret_key: impl Into<String>) -> Self {
        debug!("Creating new Stripe client");
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_API_URL.to_string(),
        }
    }

    /// Creates a client from `STRIPE_SECRET_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset or empty.
    pub fn from_env() -> Result<Self, BillingError> {
        match std::env::var("STRIPE_SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(BillingError::new(BillingErrorKind::Configuration(
                "STRIPE_SECRET_KEY environment variable not set".to_string(),
            ))),
        }
    }

    /// Point the client at another API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl BillingProvider for StripeBilling {
    #[instrument(skip(self))]
    async fn create_customer(&self) -> Result<String, BillingError> {
        debug!("Creating Stripe customer");

        let response = self
            .client
            .post(format!("{}/v1/customers", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Stripe");
                BillingError::new(BillingErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            error!(status = %status, message = %message, "Stripe returned error");
            return Err(BillingError::new(BillingErrorKind::Api(format!(
                "{}: {}",
                status, message
            ))));
        }

        let customer: CustomerResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse Stripe response");
            BillingError::new(BillingErrorKind::Api(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        debug!(customer_id = %customer.id, "Created Stripe customer");
        Ok(customer.id)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}
