//! # fc-03-authority-gateway
//!
//! Thin transport adapter for the authority's three web-service operations:
//! code issuance, document reception and document query/annulment.
//!
//! ## Fault Normalization
//!
//! ```text
//! connect refused / timeout ───────────────→ GatewayFault::ServiceUnavailable
//! authority fault envelope / bad payload ──→ GatewayFault::ProtocolFault
//! status code outside known enumeration ──→ GatewayFault::UnsupportedStatus
//! ```
//!
//! No retry logic lives here and no state is kept: every operation is
//! independently callable and independently faultable. Retries, contingency
//! decisions and state-machine consequences belong to the invoice
//! lifecycle controller.
//!
//! Every request carries an explicit timeout; the gateway never silently
//! hangs on the authority's unpredictable latency.

pub mod adapters;
pub mod error;
pub mod ports;
pub mod wire;

pub use adapters::http::{HttpAuthorityGateway, HttpGatewayConfig};
pub use adapters::mock::MockAuthorityGateway;
pub use error::GatewayResult;
pub use ports::inbound::AuthorityApi;
pub use wire::{
    AnnulmentRequest, AuthorityStatus, InvoiceEnvelope, InvoiceQuery, InvoiceStatusReport,
    IssueCodeRequest, IssuedCode, SubmissionOutcome,
};
