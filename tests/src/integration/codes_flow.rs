//! Authorization code behavior observed through the wired stack.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::common::{stack, transaction};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_emissions_issue_codes_exactly_once() {
    let s = Arc::new(stack());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let s = s.clone();
        handles.push(tokio::spawn(
            async move { s.core.emit_invoice(transaction()).await },
        ));
    }

    let mut sequences = Vec::new();
    for handle in handles {
        let invoice = handle.await.unwrap().unwrap();
        sequences.push(invoice.sequence);
    }

    // one software issuance and one daily issuance serve all eight
    // emissions, however they raced
    assert_eq!(s.gateway.issue_calls.load(Ordering::SeqCst), 2);

    // and the sequence space stays strictly monotonic with no reuse
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=8).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_daily_code_is_reused_across_emissions() {
    let s = stack();
    s.core.emit_invoice(transaction()).await.unwrap();
    s.core.emit_invoice(transaction()).await.unwrap();
    s.core.emit_invoice(transaction()).await.unwrap();

    assert_eq!(s.gateway.issue_calls.load(Ordering::SeqCst), 2);
    assert_eq!(s.gateway.submit_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_expired_daily_code_rotates_on_next_emission() {
    let s = stack();
    s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(s.gateway.issue_calls.load(Ordering::SeqCst), 2);

    // the mock issues 24h windows; the next business day needs new codes
    s.clock.advance(chrono::Duration::hours(25));
    s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(s.gateway.issue_calls.load(Ordering::SeqCst), 4);
}
