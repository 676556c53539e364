//! Error types for the invoice lifecycle.
//!
//! The controller is the single place that turns gateway faults into
//! state-machine consequences; everything below it only reports.

use fc_01_checksum_codec::CodecError;
use fc_02_authorization_codes::CodeStoreError;
use shared_types::{GatewayFault, InvoiceRef, InvoiceState, SalesPoint};
use thiserror::Error;

/// Invoice lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No invoice persisted under this reference.
    #[error("Invoice {invoice} not found")]
    NotFound { invoice: InvoiceRef },

    /// The requested state change is not in the transition table.
    #[error("Invalid state transition {from} -> {to}")]
    InvalidTransition {
        from: InvoiceState,
        to: InvoiceState,
    },

    /// Annulment attempted from a state other than ACCEPTED.
    #[error("Annulment not allowed for invoice {invoice} in state {state}")]
    AnnulmentNotAllowed {
        invoice: InvoiceRef,
        state: InvoiceState,
    },

    /// Contingency resubmission attempted on a non-ERROR invoice.
    #[error("Invoice {invoice} in state {state} is not regularizable")]
    NotRegularizable {
        invoice: InvoiceRef,
        state: InvoiceState,
    },

    /// A second invoice produced the same unique code; the deterministic
    /// derivation makes this a data fault, never a coincidence.
    #[error("Duplicate unique code {unique_code}")]
    DuplicateUniqueCode { unique_code: String },

    /// The 10-digit sequence space for this sales point is spent.
    #[error("Invoice sequence space exhausted for sales point {sales_point}")]
    SequenceExhausted { sales_point: SalesPoint },

    /// Unique-code derivation failed (precondition violation).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Authorization code resolution failed.
    #[error(transparent)]
    Codes(#[from] CodeStoreError),

    /// Gateway fault outside the submission path (query, annulment).
    #[error(transparent)]
    Gateway(#[from] GatewayFault),

    /// Invoice repository failure.
    #[error("Invoice repository failure: {reason}")]
    Repository { reason: String },

    /// The QR-payment collaborator could not resolve the payment.
    #[error("Payment could not be resolved: {reason}")]
    PaymentUnresolved { reason: String },
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
