//! Driven Ports (outbound dependencies).

use async_trait::async_trait;
use shared_types::InvoiceRef;

use crate::domain::ContingencyBatch;
use crate::error::RegularizerResult;

/// Contingency batch persistence.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// All batches not yet closed.
    async fn open_batches(&self) -> RegularizerResult<Vec<ContingencyBatch>>;

    /// Persist a new batch.
    async fn insert(&self, batch: ContingencyBatch) -> RegularizerResult<()>;

    /// Replace a stored batch.
    async fn update(&self, batch: ContingencyBatch) -> RegularizerResult<()>;
}

/// Outcome of one resubmission attempt, as seen by the regularizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegularizationOutcome {
    /// A replacement invoice reached a settled state; the member is done.
    Settled { replacement: InvoiceRef },
    /// The authority was still unreachable (or the replacement did not
    /// settle); the member stays pending for a later sweep.
    StillFailing,
}

/// Bridge to the invoice lifecycle controller.
#[async_trait]
pub trait Resubmitter: Send + Sync {
    /// Re-emit the ERROR-state invoice as a fresh record and report how it
    /// settled.
    async fn resubmit(&self, invoice: InvoiceRef) -> RegularizerResult<RegularizationOutcome>;

    /// Flag the invoice as expired contingency (deadline lapsed).
    async fn mark_expired(&self, invoice: InvoiceRef) -> RegularizerResult<()>;
}
