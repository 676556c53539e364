//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name emitted with every log line
    pub service_name: String,

    /// Subsystem identifier (01-05, or 00 for the composition root)
    pub subsystem_id: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs (containers/production)
    pub json_logs: bool,

    /// Deployment environment name (production, staging, dev)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "fiscal-core".to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            environment: "dev".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FC_SERVICE_NAME`: Service name (default: fiscal-core)
    /// - `FC_SUBSYSTEM_ID`: Subsystem ID (default: 00)
    /// - `FC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FC_JSON_LOGS`: Enable JSON logs (default: false; true in containers)
    /// - `FC_ENVIRONMENT`: Deployment environment (default: dev)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("FC_SERVICE_NAME").unwrap_or_else(|_| "fiscal-core".to_string()),

            subsystem_id: env::var("FC_SUBSYSTEM_ID").unwrap_or_else(|_| "00".to_string()),

            log_level: env::var("FC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("FC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            environment: env::var("FC_ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
        }
    }

    /// Create configuration for a specific subsystem.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Self {
        let mut config = Self::from_env();
        config.subsystem_id = subsystem_id.to_string();
        config.service_name = format!("fc-{}-{}", subsystem_id, subsystem_name);
        config
    }

    /// Get the full service name including subsystem.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "00" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}
