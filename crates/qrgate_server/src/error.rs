//! Mapping of gateway errors onto HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use qrgate_error::{GatewayError, GatewayErrorKind};
use serde_json::json;

/// A gateway error on its way to the caller.
///
/// Bodies are always `{"error": <message>, ...}`. Quota rejections carry the
/// usage figures and upgrade link; rate-limit rejections carry the retry hint
/// in the body and in a `Retry-After` header.
#[derive(Debug)]
pub struct ApiError(GatewayError);

impl ApiError {
    /// The underlying gateway error.
    pub fn kind(&self) -> &GatewayErrorKind {
        self.0.kind()
    }

    /// HTTP status carrying this error.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            GatewayErrorKind::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayErrorKind::Unauthenticated | GatewayErrorKind::InvalidCredential => {
                StatusCode::UNAUTHORIZED
            }
            GatewayErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayErrorKind::RateLimited { .. } | GatewayErrorKind::QuotaExceeded { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            GatewayErrorKind::RenderFailed(_)
            | GatewayErrorKind::StoreUnavailable(_)
            | GatewayErrorKind::BillingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Internal failures are summarised.
    fn message(&self) -> String {
        match self.kind() {
            GatewayErrorKind::RenderFailed(_) => "Failed to generate QR code".to_string(),
            GatewayErrorKind::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            GatewayErrorKind::BillingFailed(_) => "Failed to create customer".to_string(),
            GatewayErrorKind::QuotaExceeded { .. } => "Monthly limit exceeded".to_string(),
            GatewayErrorKind::RateLimited { .. } => "Rate limit exceeded".to_string(),
            kind => kind.to_string(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        match self.0.kind {
            GatewayErrorKind::QuotaExceeded {
                usage,
                limit,
                upgrade_url,
            } => (
                status,
                Json(json!({
                    "error": message,
                    "usage": usage,
                    "limit": limit,
                    "upgrade_url": upgrade_url,
                })),
            )
                .into_response(),
            GatewayErrorKind::RateLimited { retry_after_secs } => {
                let mut response = (
                    status,
                    Json(json!({
                        "error": message,
                        "retry_after_secs": retry_after_secs,
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            _ => (status, Json(json!({ "error": message }))).into_response(),
        }
    }
}
