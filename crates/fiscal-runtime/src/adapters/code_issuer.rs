//! Bridges the code store's issuance port onto the authority gateway.

use std::sync::Arc;

use async_trait::async_trait;
use fc_02_authorization_codes::{CodeIssuer, IssuedCodeFields};
use fc_03_authority_gateway::{AuthorityApi, IssueCodeRequest};
use shared_types::{
    authority_timestamp, parse_authority_timestamp, CodeKind, GatewayFault, SalesPoint, TimeSource,
    Timestamp,
};

/// Issues authorization codes through the gateway, translating between the
/// store's typed fields and the authority wire format.
pub struct GatewayCodeIssuer<G> {
    gateway: Arc<G>,
    issuer_tax_id: u64,
    system_code: String,
    time: Arc<dyn TimeSource>,
}

impl<G> GatewayCodeIssuer<G> {
    pub fn new(
        gateway: Arc<G>,
        issuer_tax_id: u64,
        system_code: String,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            gateway,
            issuer_tax_id,
            system_code,
            time,
        }
    }
}

fn parse_window_edge(raw: &str, field: &str) -> Result<Timestamp, GatewayFault> {
    parse_authority_timestamp(raw).ok_or_else(|| GatewayFault::ProtocolFault {
        fault_code: None,
        message: format!("unparseable {field} {raw:?} in issuance response"),
    })
}

#[async_trait]
impl<G> CodeIssuer for GatewayCodeIssuer<G>
where
    G: AuthorityApi,
{
    async fn issue_code(
        &self,
        kind: CodeKind,
        sales_point: SalesPoint,
        software_code: Option<&str>,
    ) -> Result<IssuedCodeFields, GatewayFault> {
        let request = IssueCodeRequest {
            issuer_tax_id: self.issuer_tax_id,
            system_code: self.system_code.clone(),
            branch_code: sales_point.branch_code,
            pos_code: sales_point.pos_code,
            code_kind: match kind {
                CodeKind::Software => "SOFTWARE".to_string(),
                CodeKind::Daily => "DAILY".to_string(),
            },
            software_code: software_code.map(String::from),
            requested_at: authority_timestamp(self.time.now()),
        };

        let issued = self.gateway.issue_code(request).await?;
        Ok(IssuedCodeFields {
            value: issued.code,
            control_code: issued.control_code,
            valid_from: parse_window_edge(&issued.valid_from, "validity start")?,
            valid_until: parse_window_edge(&issued.valid_until, "validity end")?,
        })
    }
}
