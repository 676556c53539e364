//! Driving Port (API - Inbound)
//!
//! These four operations are the only entry points the surrounding
//! application is allowed to call.

use async_trait::async_trait;
use shared_types::{InvoiceRef, SalesPoint};

use crate::domain::invoice::FiscalInvoice;
use crate::error::LifecycleResult;

/// Transaction to be invoiced, as handed over by the business layer.
#[derive(Debug, Clone)]
pub struct TransactionDetails {
    /// Sales point emitting the invoice.
    pub sales_point: SalesPoint,
    /// Customer tax identifier.
    pub customer_tax_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// Payment reference; resolved through the QR-payment collaborator
    /// when no direct amount is given.
    pub payment_reference: String,
    /// Direct amount in minor units; `None` defers to payment resolution.
    pub amount_cents: Option<u64>,
}

/// Primary invoice lifecycle API.
#[async_trait]
pub trait EmissionApi: Send + Sync {
    /// Emit an invoice for a transaction: derive the unique code, submit
    /// to the authority, persist the resulting state.
    async fn emit_invoice(&self, transaction: TransactionDetails) -> LifecycleResult<FiscalInvoice>;

    /// Current state of an invoice. Settled states answer from the store;
    /// a SUBMITTED invoice triggers an authority query. Idempotent.
    async fn query_invoice(&self, invoice: InvoiceRef) -> LifecycleResult<FiscalInvoice>;

    /// Annul an ACCEPTED invoice. Any other state fails fast with a named
    /// precondition error.
    async fn annul_invoice(
        &self,
        invoice: InvoiceRef,
        reason_code: u32,
    ) -> LifecycleResult<FiscalInvoice>;

    /// Re-emit an ERROR-state contingency invoice as a fresh record with a
    /// new sequence and unique code. Called by the regularizer, never by
    /// the surrounding application.
    async fn resubmit_contingency(&self, invoice: InvoiceRef) -> LifecycleResult<FiscalInvoice>;

    /// Flag an ERROR-state invoice whose regularization deadline lapsed.
    /// `EXPIRED_CONTINGENCY` is terminal and distinct from `ERROR`; the
    /// record now requires manual operator reconciliation. Called by the
    /// regularizer, never by the surrounding application.
    async fn expire_contingency(&self, invoice: InvoiceRef) -> LifecycleResult<FiscalInvoice>;
}
