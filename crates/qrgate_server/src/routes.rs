//! Route table and request handlers.

use crate::{ApiError, AppState};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use qrgate_core::{ArtifactId, ArtifactView, RenderRequest};
use qrgate_error::{GatewayError, GatewayErrorKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Build the gateway router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/generate", post(generate))
        .route("/api/usage", get(usage))
        .route("/api/webhook/stripe", post(stripe_webhook))
        .route("/qr/:id", get(view))
        .route("/analytics/:id", get(analytics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

#[derive(Debug, Serialize)]
struct PlanSummary {
    quota: u64,
    features: Vec<qrgate_core::Feature>,
}

/// Service banner with pricing derived from the plan catalog.
async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let pricing: BTreeMap<String, PlanSummary> = state
        .gateway()
        .catalog()
        .iter()
        .map(|plan| {
            (
                plan.tier().to_string(),
                PlanSummary {
                    quota: *plan.quota(),
                    features: plan.features().iter().collect(),
                },
            )
        })
        .collect();

    Json(json!({
        "service": "qrgate",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "https://qrapi.dev/docs",
        "pricing": pricing,
    }))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[instrument(skip_all)]
async fn register(State(state): State<AppState>) -> Result<Response, ApiError> {
    let registration = state.gateway().register().await?;
    let account = &registration.account;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "api_key": account.api_key(),
            "plan": account.plan(),
            "limit": registration.limit,
            "message": format!(
                "Welcome! You have {} free QR codes per month.",
                registration.limit
            ),
        })),
    )
        .into_response())
}

#[instrument(skip_all)]
async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let presented = presented_key(&headers);
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            // Credentials and admission are still checked before the body.
            state.gateway().admit(presented).await?;
            return Err(GatewayError::new(GatewayErrorKind::InvalidRequest(
                rejection.body_text(),
            ))
            .into());
        }
    };

    let generation = state.gateway().generate(presented, &request).await?;
    let (artifact, image, format) = generation.into_parts();
    let id = artifact.id();
    Ok(Json(json!({
        "id": id,
        "qr_code": base64::engine::general_purpose::STANDARD.encode(&image),
        "format": format,
        "qr_url": state.qr_url(id),
        "analytics": state.analytics_url(id),
    }))
    .into_response())
}

#[instrument(skip_all)]
async fn usage(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let report = state.gateway().usage(presented_key(&headers)).await?;
    Ok(Json(report).into_response())
}

/// Acknowledge billing events. Payment lifecycle handling is out of scope.
async fn stripe_webhook(body: Bytes) -> impl IntoResponse {
    let event_type = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|event| event.get("type").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());
    info!(event_type = %event_type, "Received billing webhook");
    Json(json!({"received": true}))
}

#[instrument(skip_all, fields(artifact_id = %id))]
async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = ArtifactId::from(id);
    match state.gateway().view(&id).await? {
        ArtifactView::Redirect(location) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        ArtifactView::Payload(data) => Ok(Json(json!({ "data": data })).into_response()),
    }
}

#[instrument(skip_all, fields(artifact_id = %id))]
async fn analytics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let stats = state.gateway().analytics(&ArtifactId::from(id)).await?;
    Ok(Json(stats).into_response())
}
