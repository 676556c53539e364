//! Contingency capture, regularization and deadline expiry.

use chrono::Duration;
use fc_05_contingency::RegularizationJob;
use shared_types::{EmissionMode, GatewayFault, InvoiceState};
use tokio::sync::mpsc;

use super::common::{stack, transaction, Stack};

fn unavailable() -> GatewayFault {
    GatewayFault::ServiceUnavailable {
        reason: "connect timed out".to_string(),
    }
}

/// Emit one invoice into the contingency path.
async fn emit_offline(s: &Stack) -> shared_types::InvoiceRef {
    s.gateway.script_submit(Err(unavailable()));
    let invoice = s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(invoice.state, InvoiceState::Error);
    assert_eq!(invoice.emission_mode, EmissionMode::Contingency);
    invoice.invoice_ref()
}

fn queue() -> (
    mpsc::Sender<RegularizationJob>,
    mpsc::Receiver<RegularizationJob>,
) {
    mpsc::channel(16)
}

#[tokio::test]
async fn test_outage_then_recovery_regularizes_the_batch() {
    let s = stack();
    let original_ref = emit_offline(&s).await;
    let regularizer = s.core.regularizer();

    // authority reachable again: sweep hands the member to the worker,
    // which re-emits it as a fresh sequence
    let (tx, mut rx) = queue();
    let report = regularizer.sweep(&tx).await.unwrap();
    assert_eq!(report.enqueued, 1);

    let job = rx.try_recv().unwrap();
    regularizer.process_job(job).await.unwrap();

    // the original stays on record, linked to its replacement
    let original = s.core.query_invoice(original_ref).await.unwrap();
    assert_eq!(original.state, InvoiceState::Error);
    let replacement_ref = original.regularized_as.unwrap();
    assert_eq!(replacement_ref.sequence, 2);

    let replacement = s.core.query_invoice(replacement_ref).await.unwrap();
    assert_eq!(replacement.state, InvoiceState::Accepted);
    assert_eq!(replacement.emission_mode, EmissionMode::Contingency);

    // batch fully resolved and closed
    let open = regularizer.sweep(&tx).await.unwrap();
    assert_eq!(open.enqueued, 0);
}

#[tokio::test]
async fn test_persistent_outage_keeps_member_pending() {
    let s = stack();
    let original_ref = emit_offline(&s).await;
    let regularizer = s.core.regularizer();

    // still down: every resubmission attempt fails too (each one burns a
    // submit call; three attempts per job)
    for _ in 0..3 {
        s.gateway.script_submit(Err(unavailable()));
    }

    let (tx, mut rx) = queue();
    regularizer.sweep(&tx).await.unwrap();
    regularizer.process_job(rx.try_recv().unwrap()).await.unwrap();

    let original = s.core.query_invoice(original_ref).await.unwrap();
    assert_eq!(original.state, InvoiceState::Error);
    assert!(original.regularized_as.is_none());

    // connectivity restored: the next sweep closes the loop
    let report = regularizer.sweep(&tx).await.unwrap();
    assert_eq!(report.enqueued, 1);
    regularizer.process_job(rx.try_recv().unwrap()).await.unwrap();

    let original = s.core.query_invoice(original_ref).await.unwrap();
    assert!(original.regularized_as.is_some());
}

#[tokio::test]
async fn test_deadline_lapse_expires_members_distinctly() {
    let s = stack();
    let original_ref = emit_offline(&s).await;
    let regularizer = s.core.regularizer();

    // past the 48h regularization window
    s.clock.advance(Duration::hours(49));

    let (tx, mut rx) = queue();
    let report = regularizer.sweep(&tx).await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.enqueued, 0);
    assert!(rx.try_recv().is_err());

    // a distinct terminal state, never merged into ERROR
    let expired = s.core.query_invoice(original_ref).await.unwrap();
    assert_eq!(expired.state, InvoiceState::ExpiredContingency);
    assert!(expired.regularized_as.is_none());
}

#[tokio::test]
async fn test_mixed_batch_expires_only_unresolved_members() {
    let s = stack();
    let first_ref = emit_offline(&s).await;
    let second_ref = emit_offline(&s).await;
    let regularizer = s.core.regularizer();

    // regularize only the first member before the deadline
    let (tx, mut rx) = queue();
    regularizer.sweep(&tx).await.unwrap();
    let first_job = rx.try_recv().unwrap();
    assert_eq!(first_job.invoice, first_ref);
    regularizer.process_job(first_job).await.unwrap();
    // drop the second job; its member stays pending
    let second_job = rx.try_recv().unwrap();
    assert_eq!(second_job.invoice, second_ref);

    // the second job never runs (worker backlog); past the deadline the
    // sweep expires its member and leaves the regularized one untouched
    drop(second_job);
    s.clock.advance(Duration::hours(49));
    let report = regularizer.sweep(&tx).await.unwrap();
    assert_eq!(report.expired, 1);

    let first = s.core.query_invoice(first_ref).await.unwrap();
    assert!(first.regularized_as.is_some());
    let second = s.core.query_invoice(second_ref).await.unwrap();
    assert_eq!(second.state, InvoiceState::ExpiredContingency);
}
