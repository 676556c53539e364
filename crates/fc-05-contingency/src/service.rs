//! Regularizer Service - batch bookkeeping and the resubmission sweep.

use std::collections::HashSet;
use std::sync::Arc;

use shared_types::{InvoiceRef, TimeSource, Timestamp};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::{BatchMember, ContingencyBatch, MemberResolution};
use crate::error::RegularizerResult;
use crate::ports::outbound::{BatchRepository, RegularizationOutcome, Resubmitter};

/// Regularizer configuration.
#[derive(Debug, Clone)]
pub struct RegularizerConfig {
    /// Authority-mandated regularization window, captured into each batch
    /// at open time.
    pub deadline: chrono::Duration,
    /// Resubmission attempts per job before giving the member back to the
    /// next sweep. Fixed count, no escalation.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub retry_backoff: std::time::Duration,
    /// Bound of the resubmission queue.
    pub queue_capacity: usize,
}

impl Default for RegularizerConfig {
    fn default() -> Self {
        Self {
            deadline: chrono::Duration::hours(48),
            max_attempts: 3,
            retry_backoff: std::time::Duration::from_secs(2),
            queue_capacity: 256,
        }
    }
}

/// A queued resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularizationJob {
    pub invoice: InvoiceRef,
}

/// What one sweep did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Members handed to the resubmission queue.
    pub enqueued: usize,
    /// Members flagged expired this sweep.
    pub expired: usize,
    /// Batches closed this sweep.
    pub batches_closed: usize,
}

/// Contingency regularizer.
///
/// `record_offline_emission` is called from the submission path; `sweep`
/// and `process_job` run on the background scheduler. All batch mutations
/// go through one async lock so the two sides never interleave.
pub struct RegularizerService<B>
where
    B: BatchRepository,
{
    config: RegularizerConfig,
    batches: Arc<B>,
    resubmitter: Arc<dyn Resubmitter>,
    time: Arc<dyn TimeSource>,
    batch_lock: tokio::sync::Mutex<()>,
    in_flight: parking_lot::Mutex<HashSet<InvoiceRef>>,
}

impl<B> RegularizerService<B>
where
    B: BatchRepository,
{
    pub fn new(
        config: RegularizerConfig,
        batches: Arc<B>,
        resubmitter: Arc<dyn Resubmitter>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            batches,
            resubmitter,
            time,
            batch_lock: tokio::sync::Mutex::new(()),
            in_flight: parking_lot::Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &RegularizerConfig {
        &self.config
    }

    /// Mark an invoice as queued; false when already in flight.
    fn try_reserve(&self, invoice: InvoiceRef) -> bool {
        self.in_flight.lock().insert(invoice)
    }

    /// Append an offline emission to the open batch, opening one (with the
    /// deadline fixed now) if none exists.
    pub async fn record_offline_emission(
        &self,
        invoice: InvoiceRef,
        at: Timestamp,
    ) -> RegularizerResult<()> {
        let _guard = self.batch_lock.lock().await;

        let open = self.batches.open_batches().await?;
        let member = BatchMember {
            invoice,
            recorded_at: at,
            resolution: MemberResolution::Pending,
        };

        match open.into_iter().next() {
            Some(mut batch) => {
                batch.members.push(member);
                self.batches.update(batch).await?;
            }
            None => {
                let mut batch = ContingencyBatch::open(at, at + self.config.deadline);
                info!(
                    batch = %batch.id,
                    deadline = %batch.deadline,
                    "Opening contingency batch"
                );
                batch.members.push(member);
                self.batches.insert(batch).await?;
            }
        }
        Ok(())
    }

    /// One pass over all open batches: expire members past the deadline,
    /// enqueue the rest for resubmission.
    pub async fn sweep(
        &self,
        queue: &mpsc::Sender<RegularizationJob>,
    ) -> RegularizerResult<SweepReport> {
        let _guard = self.batch_lock.lock().await;
        let now = self.time.now();
        let mut report = SweepReport::default();

        for mut batch in self.batches.open_batches().await? {
            let past_deadline = now > batch.deadline;
            let mut changed = false;

            for member in batch.members.iter_mut() {
                if !member.resolution.is_pending() {
                    continue;
                }

                if past_deadline {
                    if let Err(error) = self.resubmitter.mark_expired(member.invoice).await {
                        warn!(invoice = %member.invoice, %error, "Failed to flag expired member");
                        continue;
                    }
                    member.resolution = MemberResolution::Expired;
                    changed = true;
                    report.expired += 1;
                    warn!(
                        batch = %batch.id,
                        invoice = %member.invoice,
                        "Member expired past regularization deadline"
                    );
                    continue;
                }

                if !self.try_reserve(member.invoice) {
                    continue;
                }
                if queue
                    .try_send(RegularizationJob {
                        invoice: member.invoice,
                    })
                    .is_ok()
                {
                    report.enqueued += 1;
                } else {
                    // queue full: release and let the next sweep retry
                    self.in_flight.lock().remove(&member.invoice);
                }
            }

            if batch.all_resolved() {
                batch.closed_at = Some(now);
                changed = true;
                report.batches_closed += 1;
                info!(batch = %batch.id, "Contingency batch closed");
            }
            if changed {
                self.batches.update(batch).await?;
            }
        }

        Ok(report)
    }

    /// Worker entry: bounded resubmission attempts with a fixed backoff,
    /// then member resolution. A still-failing member goes back to the
    /// next sweep.
    pub async fn process_job(&self, job: RegularizationJob) -> RegularizerResult<()> {
        let mut settled = None;

        for attempt in 1..=self.config.max_attempts {
            match self.resubmitter.resubmit(job.invoice).await {
                Ok(RegularizationOutcome::Settled { replacement }) => {
                    settled = Some(replacement);
                    break;
                }
                Ok(RegularizationOutcome::StillFailing) => {
                    warn!(
                        invoice = %job.invoice,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        "Resubmission attempt failed"
                    );
                }
                Err(error) => {
                    warn!(invoice = %job.invoice, attempt, %error, "Resubmission error");
                }
            }
            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.retry_backoff).await;
            }
        }

        match settled {
            Some(replacement) => self.resolve_member(job.invoice, replacement).await,
            None => {
                self.in_flight.lock().remove(&job.invoice);
                Ok(())
            }
        }
    }

    async fn resolve_member(
        &self,
        invoice: InvoiceRef,
        replacement: InvoiceRef,
    ) -> RegularizerResult<()> {
        let _guard = self.batch_lock.lock().await;
        let now = self.time.now();

        for mut batch in self.batches.open_batches().await? {
            let Some(member) = batch
                .members
                .iter_mut()
                .find(|m| m.invoice == invoice && m.resolution.is_pending())
            else {
                continue;
            };

            member.resolution = MemberResolution::Regularized { replacement };
            info!(
                batch = %batch.id,
                invoice = %invoice,
                replacement = %replacement,
                "Contingency member regularized"
            );

            if batch.all_resolved() {
                batch.closed_at = Some(now);
                info!(batch = %batch.id, "Contingency batch closed");
            }
            self.batches.update(batch).await?;
            break;
        }

        self.in_flight.lock().remove(&invoice);
        Ok(())
    }
}
