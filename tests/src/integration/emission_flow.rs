//! Emission, query and annulment through the wired facade.

use std::sync::atomic::Ordering;

use fc_03_authority_gateway::{AuthorityStatus, InvoiceStatusReport, SubmissionOutcome};
use fc_04_invoice_lifecycle::LifecycleError;
use shared_types::{GatewayFault, InvoiceState};

use super::common::{stack, transaction};

/// Documented end-to-end fixture: issuer 1023456789, sequence 1, branch
/// 0/0, modality 1, online emission, document type 1, sector 01, emitted
/// 2024-07-01 14:30:25.123, daily control digest AB12CD34EF56.
const EXPECTED_UNIQUE_CODE: &str = "46071AF768895B07BC5D797465EA444C09F69E06A2AB12CD34EF56";

#[tokio::test]
async fn test_emission_produces_documented_unique_code() {
    let s = stack();
    let invoice = s.core.emit_invoice(transaction()).await.unwrap();

    assert_eq!(invoice.unique_code, EXPECTED_UNIQUE_CODE);
    assert_eq!(invoice.state, InvoiceState::Accepted);

    let envelope = s.gateway.last_envelope().unwrap();
    assert_eq!(envelope.unique_code, EXPECTED_UNIQUE_CODE);
    assert_eq!(envelope.issued_at, "20240701143025123");
    assert_eq!(envelope.issuer_tax_id, 1023456789);
    assert_eq!(envelope.sequence, 1);
}

#[tokio::test]
async fn test_unique_code_is_reproducible_from_stored_fields() {
    let s = stack();
    let invoice = s.core.emit_invoice(transaction()).await.unwrap();

    // the unique code is a deterministic function of the persisted fields:
    // recomputing from them must reproduce it byte for byte
    let fields = fc_01_checksum_codec::UniqueCodeFields {
        issuer_tax_id: 1023456789,
        issued_at: invoice.issued_at,
        branch_code: invoice.sales_point.branch_code,
        modality: fc_01_checksum_codec::Modality::Electronic,
        emission_mode: invoice.emission_mode,
        document_type: 1,
        sector_document: 1,
        sequence: invoice.sequence,
        pos_code: invoice.sales_point.pos_code,
    };
    let recomputed = fc_01_checksum_codec::build_unique_code(&fields, "AB12CD34EF56").unwrap();
    assert_eq!(recomputed, invoice.unique_code);
}

#[tokio::test]
async fn test_accepted_invoice_reaches_renderer_collaborator() {
    let s = stack();
    s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(s.renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejection_does_not_burn_the_sequence_space() {
    let s = stack();
    s.gateway.script_submit(Ok(SubmissionOutcome {
        status: AuthorityStatus::Rejected,
        reception_code: None,
        rejection_reasons: vec!["document failed validation".to_string()],
    }));

    let rejected = s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(rejected.state, InvoiceState::Rejected);
    assert_eq!(rejected.sequence, 1);

    // sequences stay strictly monotonic: the rejected number is never
    // reused for the corrected resubmission
    let corrected = s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(corrected.state, InvoiceState::Accepted);
    assert_eq!(corrected.sequence, 2);
    assert_ne!(corrected.unique_code, rejected.unique_code);
}

#[tokio::test]
async fn test_pending_validation_resolves_through_query() {
    let s = stack();
    s.gateway.script_submit(Ok(SubmissionOutcome {
        status: AuthorityStatus::PendingValidation,
        reception_code: None,
        rejection_reasons: Vec::new(),
    }));

    let pending = s.core.emit_invoice(transaction()).await.unwrap();
    assert_eq!(pending.state, InvoiceState::Submitted);

    s.gateway.script_query(Ok(InvoiceStatusReport {
        status: AuthorityStatus::Validated,
        reception_code: Some("REC-LATE".to_string()),
        rejection_reasons: Vec::new(),
    }));

    let resolved = s.core.query_invoice(pending.invoice_ref()).await.unwrap();
    assert_eq!(resolved.state, InvoiceState::Accepted);
    assert_eq!(resolved.reception_code.as_deref(), Some("REC-LATE"));

    // now settled: repeated queries are answered locally
    s.core.query_invoice(pending.invoice_ref()).await.unwrap();
    assert_eq!(s.gateway.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_annulment_through_the_facade() {
    let s = stack();
    let invoice = s.core.emit_invoice(transaction()).await.unwrap();

    let annulled = s.core.annul_invoice(invoice.invoice_ref(), 1).await.unwrap();
    assert_eq!(annulled.state, InvoiceState::Annulled);

    let err = s
        .core
        .annul_invoice(invoice.invoice_ref(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AnnulmentNotAllowed { .. }));
}

#[tokio::test]
async fn test_unknown_authority_status_is_surfaced_verbatim() {
    let s = stack();
    s.gateway
        .script_submit(Err(GatewayFault::UnsupportedStatus { code: 917 }));

    let err = s.core.emit_invoice(transaction()).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Gateway(GatewayFault::UnsupportedStatus { code: 917 })
    ));
}
