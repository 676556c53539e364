//! Authorization code entity and validity rules.

use serde::{Deserialize, Serialize};
use shared_types::{CodeKind, SalesPoint, Timestamp};
use uuid::Uuid;

/// A rotating authorization code issued by the authority.
///
/// Immutable after creation with one exception: on supersession the
/// predecessor's `valid_until` is clipped to the successor's `issued_at`,
/// modeling the authority's non-overlapping validity windows. Records are
/// never deleted; invoices emitted under a superseded code still reference
/// it as audit evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Local identifier for parent references and supersession.
    pub id: Uuid,
    /// Software or Daily.
    pub kind: CodeKind,
    /// Opaque code value as issued by the authority.
    pub value: String,
    /// Authority control digest; for daily codes this is the suffix of
    /// every unique invoice code computed under it.
    pub control_code: String,
    /// Owning sales point.
    pub sales_point: SalesPoint,
    /// Owning software code (daily codes only).
    pub parent: Option<Uuid>,
    /// Start of the authority-declared validity window.
    pub issued_at: Timestamp,
    /// End of the validity window; clipped on supersession.
    pub valid_until: Timestamp,
    /// Authority-declared validity start minus local now at issuance,
    /// in seconds. Retained for drift diagnostics.
    pub clock_skew_secs: i64,
}

impl AuthorizationCode {
    /// Whether the code is valid at `instant`:
    /// `issued_at <= instant < valid_until`.
    pub fn is_valid_at(&self, instant: Timestamp) -> bool {
        self.issued_at <= instant && instant < self.valid_until
    }
}
