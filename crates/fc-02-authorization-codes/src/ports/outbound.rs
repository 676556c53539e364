//! Driven Ports (outbound dependencies).

use async_trait::async_trait;
use shared_types::{CodeKind, GatewayFault, SalesPoint, Timestamp};
use uuid::Uuid;

use crate::domain::AuthorizationCode;
use crate::error::CodeStoreResult;

/// Persistence for authorization codes.
///
/// The store is the single source of truth for code validity; the service
/// layer caches nothing beyond the double-checked read inside one fetch.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Latest code of `kind` for `sales_point` that is valid at `now`.
    /// "Latest" breaks ties by `issued_at`.
    async fn latest_valid(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        now: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>>;

    /// The code of `kind` that was valid at an arbitrary past `instant`.
    /// Audit lookup for invoices emitted under superseded codes.
    async fn valid_at(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
        instant: Timestamp,
    ) -> CodeStoreResult<Option<AuthorizationCode>>;

    /// Latest code of `kind` regardless of validity. Used to find the
    /// predecessor to clip on supersession.
    async fn latest(
        &self,
        sales_point: SalesPoint,
        kind: CodeKind,
    ) -> CodeStoreResult<Option<AuthorizationCode>>;

    /// Persist a freshly issued code.
    async fn insert(&self, code: AuthorizationCode) -> CodeStoreResult<()>;

    /// Clip a predecessor's end-of-validity to `new_end` (supersession).
    /// The record is otherwise untouched and never deleted.
    async fn clip_validity(&self, id: Uuid, new_end: Timestamp) -> CodeStoreResult<()>;
}

/// Fields of a code as returned by the authority's issuance operation.
#[derive(Debug, Clone)]
pub struct IssuedCodeFields {
    /// Opaque code value.
    pub value: String,
    /// Authority control digest.
    pub control_code: String,
    /// Authority-declared validity start.
    pub valid_from: Timestamp,
    /// Authority-declared validity end.
    pub valid_until: Timestamp,
}

/// Gateway-facing issuance port.
///
/// Failures surface as [`GatewayFault`] untouched; retry and contingency
/// decisions belong to the invoice lifecycle controller, not this store.
#[async_trait]
pub trait CodeIssuer: Send + Sync {
    /// Request a fresh code of `kind` for `sales_point`. Daily issuance
    /// passes the owning software code's value.
    async fn issue_code(
        &self,
        kind: CodeKind,
        sales_point: SalesPoint,
        software_code: Option<&str>,
    ) -> Result<IssuedCodeFields, GatewayFault>;
}
