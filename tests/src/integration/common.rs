//! Shared harness: a wired core over the scripted gateway with a manual
//! clock.

use std::sync::Arc;

use chrono::TimeZone;
use chrono::Utc;
use fc_03_authority_gateway::MockAuthorityGateway;
use fc_04_invoice_lifecycle::test_utils::{FixedPaymentResolver, RecordingRenderer};
use fc_04_invoice_lifecycle::TransactionDetails;
use fiscal_runtime::{FiscalCore, RuntimeConfig};
use shared_types::{ManualTimeSource, SalesPoint, Timestamp};

pub struct Stack {
    pub core: FiscalCore<MockAuthorityGateway>,
    pub gateway: Arc<MockAuthorityGateway>,
    pub renderer: Arc<RecordingRenderer>,
    pub clock: Arc<ManualTimeSource>,
}

/// Emission instant every test starts from.
pub fn start_instant() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 7, 1, 14, 30, 25)
        .unwrap()
        .checked_add_signed(chrono::Duration::milliseconds(123))
        .unwrap()
}

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        issuer_tax_id: 1023456789,
        system_code: "SYS-7".to_string(),
        retry_backoff_secs: 0,
        ..Default::default()
    }
}

pub fn stack() -> Stack {
    let gateway = Arc::new(MockAuthorityGateway::new());
    let renderer = Arc::new(RecordingRenderer::default());
    let clock = Arc::new(ManualTimeSource::new(start_instant()));
    let core = FiscalCore::new(
        test_config(),
        gateway.clone(),
        clock.clone(),
        Arc::new(FixedPaymentResolver {
            amount_cents: 150_000,
        }),
        renderer.clone(),
    )
    .unwrap();
    Stack {
        core,
        gateway,
        renderer,
        clock,
    }
}

pub fn transaction() -> TransactionDetails {
    TransactionDetails {
        sales_point: SalesPoint::new(0, 0),
        customer_tax_id: "987654321".to_string(),
        customer_name: "ACME Institute".to_string(),
        payment_reference: "QR-550e8400".to_string(),
        amount_cents: Some(150_000),
    }
}
