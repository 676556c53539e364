//! Bridges between the lifecycle controller and the regularizer.
//!
//! The two subsystems reference each other (submission failures append to
//! batches; the sweep resubmits through the controller), so the resubmitter
//! side is late-bound to break the construction cycle.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use fc_02_authorization_codes::CodeStoreError;
use fc_04_invoice_lifecycle::{ContingencyLog, EmissionApi, LifecycleError, LifecycleResult};
use fc_05_contingency::{
    BatchRepository, RegularizationOutcome, RegularizerError, RegularizerResult,
    RegularizerService, Resubmitter,
};
use shared_types::{InvoiceRef, InvoiceState, Timestamp};

/// Contingency log over the regularizer service.
pub struct RegularizerLog<B>
where
    B: BatchRepository,
{
    regularizer: Arc<RegularizerService<B>>,
}

impl<B> RegularizerLog<B>
where
    B: BatchRepository,
{
    pub fn new(regularizer: Arc<RegularizerService<B>>) -> Self {
        Self { regularizer }
    }
}

#[async_trait]
impl<B> ContingencyLog for RegularizerLog<B>
where
    B: BatchRepository + 'static,
{
    async fn record_offline_emission(
        &self,
        invoice: InvoiceRef,
        at: Timestamp,
    ) -> LifecycleResult<()> {
        self.regularizer
            .record_offline_emission(invoice, at)
            .await
            .map_err(|e| LifecycleError::Repository {
                reason: e.to_string(),
            })
    }
}

/// Resubmitter over the lifecycle controller.
pub struct LifecycleResubmitter<A>
where
    A: EmissionApi,
{
    emission: Arc<A>,
}

impl<A> LifecycleResubmitter<A>
where
    A: EmissionApi,
{
    pub fn new(emission: Arc<A>) -> Self {
        Self { emission }
    }
}

#[async_trait]
impl<A> Resubmitter for LifecycleResubmitter<A>
where
    A: EmissionApi + 'static,
{
    async fn resubmit(&self, invoice: InvoiceRef) -> RegularizerResult<RegularizationOutcome> {
        match self.emission.resubmit_contingency(invoice).await {
            Ok(replacement)
                if matches!(
                    replacement.state,
                    InvoiceState::Accepted | InvoiceState::Rejected
                ) =>
            {
                Ok(RegularizationOutcome::Settled {
                    replacement: replacement.invoice_ref(),
                })
            }
            // the replacement errored or is still mid-flight; try again on
            // a later sweep
            Ok(_) => Ok(RegularizationOutcome::StillFailing),
            Err(LifecycleError::Gateway(_))
            | Err(LifecycleError::Codes(CodeStoreError::Gateway(_))) => {
                Ok(RegularizationOutcome::StillFailing)
            }
            Err(error) => Err(RegularizerError::Resubmission {
                reason: error.to_string(),
            }),
        }
    }

    async fn mark_expired(&self, invoice: InvoiceRef) -> RegularizerResult<()> {
        self.emission
            .expire_contingency(invoice)
            .await
            .map(|_| ())
            .map_err(|error| RegularizerError::Resubmission {
                reason: error.to_string(),
            })
    }
}

/// Late-bound resubmitter: constructed empty, bound once wiring is done.
#[derive(Default)]
pub struct LateResubmitter {
    inner: OnceLock<Arc<dyn Resubmitter>>,
}

impl LateResubmitter {
    pub fn bind(&self, resubmitter: Arc<dyn Resubmitter>) {
        let _ = self.inner.set(resubmitter);
    }

    fn get(&self) -> RegularizerResult<&Arc<dyn Resubmitter>> {
        self.inner.get().ok_or(RegularizerError::Resubmission {
            reason: "resubmitter not wired yet".to_string(),
        })
    }
}

#[async_trait]
impl Resubmitter for LateResubmitter {
    async fn resubmit(&self, invoice: InvoiceRef) -> RegularizerResult<RegularizationOutcome> {
        self.get()?.resubmit(invoice).await
    }

    async fn mark_expired(&self, invoice: InvoiceRef) -> RegularizerResult<()> {
        self.get()?.mark_expired(invoice).await
    }
}
