//! Bridges the lifecycle's code port onto the authorization-code service.

use std::sync::Arc;

use async_trait::async_trait;
use fc_02_authorization_codes::{AuthorizationCodeService, CodeStoreResult};
use fc_03_authority_gateway::AuthorityApi;
use fc_04_invoice_lifecycle::{CodeProvider, EmissionCodes};
use shared_types::SalesPoint;

use crate::adapters::code_issuer::GatewayCodeIssuer;
use crate::adapters::code_store::CodeStore;

/// Code service as wired by the runtime.
pub type WiredCodeService<G> = AuthorizationCodeService<CodeStore, GatewayCodeIssuer<G>>;

/// Supplies emission codes from the wired code service.
pub struct ServiceCodeProvider<G>
where
    G: AuthorityApi,
{
    codes: Arc<WiredCodeService<G>>,
}

impl<G> ServiceCodeProvider<G>
where
    G: AuthorityApi,
{
    pub fn new(codes: Arc<WiredCodeService<G>>) -> Self {
        Self { codes }
    }
}

#[async_trait]
impl<G> CodeProvider for ServiceCodeProvider<G>
where
    G: AuthorityApi + 'static,
{
    async fn emission_codes(&self, sales_point: SalesPoint) -> CodeStoreResult<EmissionCodes> {
        let daily = self.codes.get_valid_daily_code(sales_point).await?;
        Ok(EmissionCodes {
            daily_code_value: daily.value,
            control_code: daily.control_code,
        })
    }
}
