//! Tracing subscriber setup.
//!
//! Builds the global subscriber from [`TelemetryConfig`]: env-filter plus
//! either a pretty console layer (development) or a JSON layer (containers).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Guard that marks the subscriber as installed. Hold it for the lifetime
/// of the application; dropping it is a no-op today but keeps the call
/// shape stable if a flushing writer is added.
pub struct TracingGuard {
    _installed: bool,
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already set (e.g. a second init in tests);
/// callers treat that as non-fatal when embedding.
pub fn init_tracing(config: &TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.full_service_name(),
        environment = %config.environment,
        "Structured logging initialized"
    );

    Ok(TracingGuard { _installed: true })
}
