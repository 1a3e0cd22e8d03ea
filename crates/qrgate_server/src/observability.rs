//! Structured logging for the qrgate server.

use qrgate_error::{ConfigError, QrGateResult};
use qrgate_rate_limit::LoggingConfig;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; `verbose` forces
/// `debug`. Output is JSON when `logging.json` is set.
pub fn init_observability(config: &LoggingConfig, verbose: bool) -> QrGateResult<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ConfigError::new(format!("Invalid log filter '{}': {}", level, e)))?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)))?;

    Ok(())
}
