//! Scriptable in-process gateway for tests.
//!
//! Responses are drained from per-operation queues; an empty queue yields a
//! plausible success so happy-path tests stay short. Call counts and the
//! last submitted envelope are recorded for assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Duration;
use parking_lot::Mutex;
use shared_types::{authority_timestamp, parse_authority_timestamp};

use crate::error::GatewayResult;
use crate::ports::inbound::AuthorityApi;
use crate::wire::{
    AnnulmentRequest, AuthorityStatus, InvoiceEnvelope, InvoiceQuery, InvoiceStatusReport,
    IssueCodeRequest, IssuedCode, SubmissionOutcome,
};

/// Gateway double driven entirely by scripted responses.
#[derive(Default)]
pub struct MockAuthorityGateway {
    issue_queue: Mutex<VecDeque<GatewayResult<IssuedCode>>>,
    submit_queue: Mutex<VecDeque<GatewayResult<SubmissionOutcome>>>,
    query_queue: Mutex<VecDeque<GatewayResult<InvoiceStatusReport>>>,
    annul_queue: Mutex<VecDeque<GatewayResult<InvoiceStatusReport>>>,

    pub issue_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub annul_calls: AtomicUsize,

    last_envelope: Mutex<Option<InvoiceEnvelope>>,
    submit_delay: Mutex<Option<std::time::Duration>>,
}

impl MockAuthorityGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next issuance response.
    pub fn script_issue(&self, result: GatewayResult<IssuedCode>) {
        self.issue_queue.lock().push_back(result);
    }

    /// Queue the next submission response.
    pub fn script_submit(&self, result: GatewayResult<SubmissionOutcome>) {
        self.submit_queue.lock().push_back(result);
    }

    /// Queue the next query response.
    pub fn script_query(&self, result: GatewayResult<InvoiceStatusReport>) {
        self.query_queue.lock().push_back(result);
    }

    /// Queue the next annulment response.
    pub fn script_annul(&self, result: GatewayResult<InvoiceStatusReport>) {
        self.annul_queue.lock().push_back(result);
    }

    /// The envelope from the most recent `submit_invoice` call.
    pub fn last_envelope(&self) -> Option<InvoiceEnvelope> {
        self.last_envelope.lock().clone()
    }

    /// Delay every submission, to exercise caller-side deadlines.
    pub fn set_submit_delay(&self, delay: std::time::Duration) {
        *self.submit_delay.lock() = Some(delay);
    }
}

#[async_trait::async_trait]
impl AuthorityApi for MockAuthorityGateway {
    async fn issue_code(&self, request: IssueCodeRequest) -> GatewayResult<IssuedCode> {
        let n = self.issue_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.issue_queue.lock().pop_front() {
            return scripted;
        }

        // default: a code valid for 24h from the requested instant
        let valid_from = parse_authority_timestamp(&request.requested_at)
            .unwrap_or_else(|| chrono::DateTime::UNIX_EPOCH);
        Ok(IssuedCode {
            code: format!("MOCK-{}-{n}", request.code_kind),
            control_code: "AB12CD34EF56".to_string(),
            valid_from: authority_timestamp(valid_from),
            valid_until: authority_timestamp(valid_from + Duration::hours(24)),
        })
    }

    async fn submit_invoice(&self, envelope: InvoiceEnvelope) -> GatewayResult<SubmissionOutcome> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_envelope.lock() = Some(envelope);
        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(scripted) = self.submit_queue.lock().pop_front() {
            return scripted;
        }

        Ok(SubmissionOutcome {
            status: AuthorityStatus::Validated,
            reception_code: Some(format!("REC-{n:08}")),
            rejection_reasons: Vec::new(),
        })
    }

    async fn query_invoice(&self, _query: InvoiceQuery) -> GatewayResult<InvoiceStatusReport> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.query_queue.lock().pop_front() {
            return scripted;
        }

        Ok(InvoiceStatusReport {
            status: AuthorityStatus::Validated,
            reception_code: Some("REC-QUERY".to_string()),
            rejection_reasons: Vec::new(),
        })
    }

    async fn annul_invoice(&self, _request: AnnulmentRequest) -> GatewayResult<InvoiceStatusReport> {
        self.annul_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.annul_queue.lock().pop_front() {
            return scripted;
        }

        Ok(InvoiceStatusReport {
            status: AuthorityStatus::Annulled,
            reception_code: None,
            rejection_reasons: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::GatewayFault;

    #[tokio::test]
    async fn test_scripted_responses_drain_in_order() {
        let mock = MockAuthorityGateway::new();
        mock.script_submit(Err(GatewayFault::ServiceUnavailable {
            reason: "connection refused".to_string(),
        }));

        let envelope = sample_envelope();
        let first = mock.submit_invoice(envelope.clone()).await;
        assert!(matches!(
            first,
            Err(GatewayFault::ServiceUnavailable { .. })
        ));

        // queue exhausted: default success
        let second = mock.submit_invoice(envelope).await.unwrap();
        assert_eq!(second.status, AuthorityStatus::Validated);
        assert_eq!(mock.submit_calls.load(Ordering::SeqCst), 2);
    }

    fn sample_envelope() -> InvoiceEnvelope {
        InvoiceEnvelope {
            issuer_tax_id: 1023456789,
            branch_code: 0,
            pos_code: 0,
            sequence: 1,
            unique_code: "46071AF7".to_string(),
            daily_code: "MOCK-DAILY-0".to_string(),
            issued_at: "20240701143025123".to_string(),
            amount_cents: 150_000,
            customer_tax_id: "987654321".to_string(),
            customer_name: "ACME".to_string(),
            emission_type: 1,
            modality: 1,
            document_type: 1,
            sector_document: 1,
        }
    }
}
