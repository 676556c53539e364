//! Error types for the authorization-code store.

use shared_types::GatewayFault;
use thiserror::Error;

/// Authorization-code store errors
#[derive(Debug, Clone, Error)]
pub enum CodeStoreError {
    /// Local clock and authority validity window disagree beyond tolerance.
    /// A configuration fault: fix the system clock, never auto-correct.
    #[error(
        "Local clock drifts {drift_secs}s from the authority's declared validity start \
         (tolerance {tolerance_secs}s); correct the system clock before issuing codes"
    )]
    ClockDriftExceeded {
        drift_secs: i64,
        tolerance_secs: i64,
    },

    /// Gateway failure during issuance; surfaced untouched so the lifecycle
    /// controller can decide on contingency, never retried here.
    #[error(transparent)]
    Gateway(#[from] GatewayFault),

    /// Repository read/write failure.
    #[error("Code repository failure: {reason}")]
    Repository { reason: String },
}

/// Result type for code store operations
pub type CodeStoreResult<T> = Result<T, CodeStoreError>;
