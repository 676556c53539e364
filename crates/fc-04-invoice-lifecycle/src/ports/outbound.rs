//! Driven Ports (outbound dependencies).

use async_trait::async_trait;
use fc_02_authorization_codes::error::CodeStoreResult;
use shared_types::{InvoiceRef, SalesPoint, Timestamp};

use crate::domain::invoice::FiscalInvoice;
use crate::error::LifecycleResult;
use crate::ports::inbound::TransactionDetails;

/// Invoice persistence.
///
/// Keyed by `(branch, sequence)` with a unique index on the computed
/// unique code. The store is the single source of truth for invoice state.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Allocate the next sequence number for `sales_point`. Strictly
    /// monotonic, never reused, not even after rejection.
    async fn next_sequence(&self, sales_point: SalesPoint) -> LifecycleResult<u64>;

    /// Persist a new invoice. Fails on a duplicate reference or a
    /// duplicate unique code.
    async fn insert(&self, invoice: FiscalInvoice) -> LifecycleResult<()>;

    /// Fetch by reference.
    async fn find(&self, invoice: InvoiceRef) -> LifecycleResult<Option<FiscalInvoice>>;

    /// Replace the stored record. The caller holds the per-invoice lock.
    async fn update(&self, invoice: FiscalInvoice) -> LifecycleResult<()>;
}

/// Codes needed to emit one invoice.
#[derive(Debug, Clone)]
pub struct EmissionCodes {
    /// Daily authorization code value, for the document envelope.
    pub daily_code_value: String,
    /// Daily code's control digest, appended to the unique code.
    pub control_code: String,
}

/// Supplies the currently valid daily code (issuing one if needed).
/// Implemented over the authorization-code service.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    async fn emission_codes(&self, sales_point: SalesPoint) -> CodeStoreResult<EmissionCodes>;
}

/// Records offline emissions for later regularization. Implemented over
/// the contingency batch store.
#[async_trait]
pub trait ContingencyLog: Send + Sync {
    /// Open a batch if none is open, then append the invoice to it.
    async fn record_offline_emission(
        &self,
        invoice: InvoiceRef,
        at: Timestamp,
    ) -> LifecycleResult<()>;
}

/// Opaque rendered document returned by the PDF collaborator.
#[derive(Debug, Clone)]
pub struct RenderedBinder(pub Vec<u8>);

/// PDF-rendering collaborator. Receives the accepted invoice (reception
/// code, unique code, line data) and returns a binder this core does not
/// interpret. Rendering failure never un-accepts an invoice.
#[async_trait]
pub trait InvoiceRenderer: Send + Sync {
    async fn render_accepted(&self, invoice: &FiscalInvoice) -> LifecycleResult<RenderedBinder>;
}

/// Resolved payment details.
#[derive(Debug, Clone)]
pub struct ResolvedPayment {
    pub amount_cents: u64,
    pub reference: String,
}

/// QR-payment collaborator, consulted only to resolve a payment's amount
/// and reference before submission; otherwise opaque.
#[async_trait]
pub trait PaymentResolver: Send + Sync {
    async fn resolve(&self, transaction: &TransactionDetails) -> LifecycleResult<ResolvedPayment>;
}
