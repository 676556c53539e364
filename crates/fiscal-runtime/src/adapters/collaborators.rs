//! Default collaborator implementations.
//!
//! The PDF renderer and QR-payment resolver are owned by the surrounding
//! application; these stand-ins keep the core runnable without them.

use async_trait::async_trait;
use fc_04_invoice_lifecycle::{
    FiscalInvoice, InvoiceRenderer, LifecycleError, LifecycleResult, PaymentResolver,
    RenderedBinder, ResolvedPayment, TransactionDetails,
};
use tracing::debug;

/// Renderer that produces an empty binder and logs the hand-off.
#[derive(Debug, Default)]
pub struct NoopRenderer;

#[async_trait]
impl InvoiceRenderer for NoopRenderer {
    async fn render_accepted(&self, invoice: &FiscalInvoice) -> LifecycleResult<RenderedBinder> {
        debug!(
            invoice = %invoice.invoice_ref(),
            reception_code = invoice.reception_code.as_deref().unwrap_or(""),
            "No renderer configured, skipping binder generation"
        );
        Ok(RenderedBinder(Vec::new()))
    }
}

/// Resolver used when no QR-payment collaborator is wired: transactions
/// must carry their amount directly.
#[derive(Debug, Default)]
pub struct DirectAmountsOnly;

#[async_trait]
impl PaymentResolver for DirectAmountsOnly {
    async fn resolve(
        &self,
        transaction: &TransactionDetails,
    ) -> LifecycleResult<ResolvedPayment> {
        Err(LifecycleError::PaymentUnresolved {
            reason: format!(
                "no payment collaborator configured to resolve {:?}",
                transaction.payment_reference
            ),
        })
    }
}
