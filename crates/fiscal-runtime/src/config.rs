//! # Runtime Configuration
//!
//! Unified configuration for all subsystems, environment-driven with sane
//! defaults and a production validation pass.

use std::env;
use std::path::PathBuf;

use fc_01_checksum_codec::Modality;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Base URL of the authority's web service.
    pub authority_base_url: String,
    /// Per-request gateway deadline in seconds.
    pub request_timeout_secs: u64,
    /// Issuer tax identifier (up to 13 digits). MUST be set in production.
    pub issuer_tax_id: u64,
    /// System code registered with the authority.
    pub system_code: String,
    /// Declared invoicing modality.
    pub modality: Modality,
    /// Document/adjustment type digit.
    pub document_type: u8,
    /// Sector document type.
    pub sector_document: u8,
    /// Tolerated clock drift against authority validity windows, seconds.
    pub clock_drift_tolerance_secs: i64,
    /// Regularization window captured into each contingency batch, hours.
    pub contingency_deadline_hours: i64,
    /// Regularization sweep interval, seconds.
    pub sweep_interval_secs: u64,
    /// Resubmission attempts per regularization job.
    pub retry_attempts: u32,
    /// Fixed backoff between resubmission attempts, seconds.
    pub retry_backoff_secs: u64,
    /// Directory for durable snapshots; in-memory stores when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            authority_base_url: "https://pilot.authority.example/api/v2".to_string(),
            request_timeout_secs: 30,
            issuer_tax_id: 0,
            system_code: String::new(),
            modality: Modality::Electronic,
            document_type: 1,
            sector_document: 1,
            clock_drift_tolerance_secs: 300,
            contingency_deadline_hours: 48,
            sweep_interval_secs: 300,
            retry_attempts: 3,
            retry_backoff_secs: 2,
            data_dir: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Issuer tax id was never configured.
    #[error("Issuer tax id is unset. Set FC_ISSUER_TAX_ID before going to production.")]
    MissingIssuerTaxId,

    /// System code was never configured.
    #[error("System code is empty. Set FC_SYSTEM_CODE before going to production.")]
    MissingSystemCode,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl RuntimeConfig {
    /// Build configuration from `FC_*` environment variables, falling back
    /// to defaults field by field.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            authority_base_url: env::var("FC_AUTHORITY_URL")
                .unwrap_or(defaults.authority_base_url),
            request_timeout_secs: env_parse("FC_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            issuer_tax_id: env_parse("FC_ISSUER_TAX_ID", defaults.issuer_tax_id),
            system_code: env::var("FC_SYSTEM_CODE").unwrap_or(defaults.system_code),
            modality: match env_parse("FC_MODALITY", 1u8) {
                2 => Modality::Computerized,
                _ => Modality::Electronic,
            },
            document_type: env_parse("FC_DOCUMENT_TYPE", defaults.document_type),
            sector_document: env_parse("FC_SECTOR_DOCUMENT", defaults.sector_document),
            clock_drift_tolerance_secs: env_parse(
                "FC_CLOCK_DRIFT_TOLERANCE_SECS",
                defaults.clock_drift_tolerance_secs,
            ),
            contingency_deadline_hours: env_parse(
                "FC_CONTINGENCY_DEADLINE_HOURS",
                defaults.contingency_deadline_hours,
            ),
            sweep_interval_secs: env_parse("FC_SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs),
            retry_attempts: env_parse("FC_RETRY_ATTEMPTS", defaults.retry_attempts),
            retry_backoff_secs: env_parse("FC_RETRY_BACKOFF_SECS", defaults.retry_backoff_secs),
            data_dir: env::var("FC_DATA_DIR").ok().map(PathBuf::from),
        }
    }

    /// Validate configuration for production readiness.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.issuer_tax_id == 0 {
            return Err(ConfigError::MissingIssuerTaxId);
        }
        if self.system_code.is_empty() {
            return Err(ConfigError::MissingSystemCode);
        }
        Ok(())
    }
}
