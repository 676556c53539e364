//! # Fiscal Telemetry
//!
//! Structured logging bootstrap for the Fiscal-Core workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fiscal_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("failed to init telemetry");
//!
//!     // Application code; all tracing events now flow through the
//!     // configured subscriber.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_SERVICE_NAME` | `fiscal-core` | Service name in log lines |
//! | `FC_SUBSYSTEM_ID` | `00` | Subsystem identifier |
//! | `FC_LOG_LEVEL` | `info` | Log level filter |
//! | `FC_JSON_LOGS` | `false` | JSON output (auto-on in containers) |
//! | `FC_ENVIRONMENT` | `dev` | Deployment environment label |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize structured logging.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    tracing_setup::init_tracing(config)
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use fiscal_telemetry::subsystem_span;
///
/// fn submit_invoice() {
///     let _span = subsystem_span!("submit_invoice", subsystem = "fc-04", sequence = 158);
///     // ... submission logic
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "fiscal-core");
    }
}
