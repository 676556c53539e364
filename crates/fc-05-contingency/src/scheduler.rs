//! Background scheduling: the periodic sweep and the resubmission worker.
//!
//! Two independent tasks connected by a bounded queue. The sweeper only
//! decides *what* needs resubmitting; the worker owns the bounded-retry
//! loop. Neither blocks request-driven submissions, which append to
//! batches concurrently through `record_offline_emission`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::ports::outbound::BatchRepository;
use crate::service::{RegularizationJob, RegularizerService};

/// Handle over the two spawned tasks.
pub struct RegularizerHandle {
    sweeper: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl RegularizerHandle {
    /// Stop both tasks. In-flight gateway calls are dropped; state already
    /// persisted stays consistent and the next start resumes from it.
    pub fn abort(&self) {
        self.sweeper.abort();
        self.worker.abort();
    }
}

/// Spawn the periodic sweep and its worker.
pub fn spawn_regularizer<B>(
    service: Arc<RegularizerService<B>>,
    sweep_interval: Duration,
) -> RegularizerHandle
where
    B: BatchRepository + 'static,
{
    let (queue, mut jobs) = mpsc::channel::<RegularizationJob>(service.config().queue_capacity);

    let worker_service = service.clone();
    let worker = tokio::spawn(async move {
        while let Some(job) = jobs.recv().await {
            if let Err(error) = worker_service.process_job(job).await {
                warn!(invoice = %job.invoice, %error, "Regularization job failed");
            }
        }
    });

    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.sweep(&queue).await {
                Ok(report) => {
                    if report.enqueued > 0 || report.expired > 0 || report.batches_closed > 0 {
                        debug!(
                            enqueued = report.enqueued,
                            expired = report.expired,
                            closed = report.batches_closed,
                            "Regularization sweep finished"
                        );
                    }
                }
                Err(error) => warn!(%error, "Regularization sweep failed"),
            }
        }
    });

    RegularizerHandle { sweeper, worker }
}
