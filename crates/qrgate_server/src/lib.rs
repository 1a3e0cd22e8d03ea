//! HTTP surface for the qrgate metered QR code gateway.
//!
//! The router exposes registration, metered generation, usage reports,
//! artifact views and scan analytics on top of a [`Gateway`]. Backends are
//! chosen at startup: PostgreSQL when built with the `database` feature and
//! `DATABASE_URL` is set, in-memory otherwise.
//!
//! # Example
//!
//! ```rust,no_run
//! use qrgate_rate_limit::QrGateConfig;
//! use qrgate_server::{AppState, Backends, build_gateway, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QrGateConfig::load()?;
//! let gateway = build_gateway(&config, Backends::in_memory())?;
//! let app = create_router(AppState::new(gateway, &config.server.base_url));
//! let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod housekeeping;
mod observability;
mod routes;
mod state;

pub use backend::{Backends, billing_provider, build_gateway, build_gateway_with};
pub use error::ApiError;
pub use housekeeping::{run_housekeeping, spawn_housekeeping};
pub use observability::init_observability;
pub use routes::{API_KEY_HEADER, create_router};
pub use state::AppState;
