//! Driving Port (API - Inbound)

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::wire::{
    AnnulmentRequest, InvoiceEnvelope, InvoiceQuery, InvoiceStatusReport, IssueCodeRequest,
    IssuedCode, SubmissionOutcome,
};

/// The authority's three logical operations plus annulment.
///
/// Each is independently callable and independently faultable. The
/// implementation applies a per-request timeout and normalizes every
/// failure into the shared fault taxonomy; it never retries.
#[async_trait]
pub trait AuthorityApi: Send + Sync {
    /// Request issuance of a software or daily authorization code.
    async fn issue_code(&self, request: IssueCodeRequest) -> GatewayResult<IssuedCode>;

    /// Submit an invoice document for reception.
    async fn submit_invoice(&self, envelope: InvoiceEnvelope) -> GatewayResult<SubmissionOutcome>;

    /// Query the current state of a previously submitted document.
    /// Idempotent; safe to call redundantly.
    async fn query_invoice(&self, query: InvoiceQuery) -> GatewayResult<InvoiceStatusReport>;

    /// Annul an accepted document.
    async fn annul_invoice(&self, request: AnnulmentRequest) -> GatewayResult<InvoiceStatusReport>;
}
