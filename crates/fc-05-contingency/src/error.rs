//! Error types for the contingency regularizer.

use thiserror::Error;

/// Regularizer errors
#[derive(Debug, Clone, Error)]
pub enum RegularizerError {
    /// Batch store read/write failure.
    #[error("Batch repository failure: {reason}")]
    Repository { reason: String },

    /// The lifecycle controller refused or failed a resubmission in a way
    /// that is not a plain "authority still unreachable".
    #[error("Resubmission failed: {reason}")]
    Resubmission { reason: String },
}

/// Result type for regularizer operations
pub type RegularizerResult<T> = Result<T, RegularizerError>;
