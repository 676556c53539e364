//! Test doubles for the lifecycle ports, shared with the workspace test
//! suite.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fc_02_authorization_codes::error::CodeStoreResult;
use parking_lot::Mutex;
use shared_types::{InvoiceRef, SalesPoint, Timestamp};

use crate::domain::invoice::FiscalInvoice;
use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::inbound::TransactionDetails;
use crate::ports::outbound::{
    CodeProvider, ContingencyLog, EmissionCodes, InvoiceRenderer, PaymentResolver, RenderedBinder,
    ResolvedPayment,
};

/// Code provider returning a fixed daily code, no gateway involved.
pub struct StaticCodeProvider {
    codes: EmissionCodes,
}

impl StaticCodeProvider {
    pub fn new(daily_code_value: &str, control_code: &str) -> Self {
        Self {
            codes: EmissionCodes {
                daily_code_value: daily_code_value.to_string(),
                control_code: control_code.to_string(),
            },
        }
    }
}

impl Default for StaticCodeProvider {
    fn default() -> Self {
        Self::new("MOCK-DAILY-0", "F60A1E2B3C4D")
    }
}

#[async_trait]
impl CodeProvider for StaticCodeProvider {
    async fn emission_codes(&self, _sales_point: SalesPoint) -> CodeStoreResult<EmissionCodes> {
        Ok(self.codes.clone())
    }
}

/// Renderer that counts invocations and returns a token binder.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl InvoiceRenderer for RecordingRenderer {
    async fn render_accepted(&self, _invoice: &FiscalInvoice) -> LifecycleResult<RenderedBinder> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedBinder(b"%PDF-stub".to_vec()))
    }
}

/// Contingency log capturing every recorded offline emission.
#[derive(Default)]
pub struct RecordingContingencyLog {
    entries: Mutex<Vec<(InvoiceRef, Timestamp)>>,
}

impl RecordingContingencyLog {
    pub fn entries(&self) -> Vec<(InvoiceRef, Timestamp)> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl ContingencyLog for RecordingContingencyLog {
    async fn record_offline_emission(
        &self,
        invoice: InvoiceRef,
        at: Timestamp,
    ) -> LifecycleResult<()> {
        self.entries.lock().push((invoice, at));
        Ok(())
    }
}

/// Payment resolver returning a fixed amount for any reference.
pub struct FixedPaymentResolver {
    pub amount_cents: u64,
}

#[async_trait]
impl PaymentResolver for FixedPaymentResolver {
    async fn resolve(
        &self,
        transaction: &TransactionDetails,
    ) -> LifecycleResult<ResolvedPayment> {
        Ok(ResolvedPayment {
            amount_cents: self.amount_cents,
            reference: transaction.payment_reference.clone(),
        })
    }
}

/// Payment resolver that always fails, for error-path tests.
pub struct UnresolvablePayments;

#[async_trait]
impl PaymentResolver for UnresolvablePayments {
    async fn resolve(
        &self,
        transaction: &TransactionDetails,
    ) -> LifecycleResult<ResolvedPayment> {
        Err(LifecycleError::PaymentUnresolved {
            reason: format!("no such payment {}", transaction.payment_reference),
        })
    }
}
