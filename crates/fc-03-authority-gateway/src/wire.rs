//! Wire contract with the authority.
//!
//! Field names, widths and the `YYYYMMDDHHmmssSSS` timestamp format are
//! authority-mandated; they are a compatibility requirement, not a style
//! choice. Only the fields this client produces or consumes are modeled.

use serde::{Deserialize, Serialize};
use shared_types::GatewayFault;

/// Status codes in the authority's document enumeration.
///
/// Anything outside this set must surface as
/// [`GatewayFault::UnsupportedStatus`], never coerced to a nearby state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityStatus {
    /// 901: document validated and accepted.
    Validated,
    /// 902: document rejected; reasons accompany the response.
    Rejected,
    /// 904: received, validation still pending.
    PendingValidation,
    /// 905: document annulled.
    Annulled,
}

impl AuthorityStatus {
    /// Map a raw authority status code onto the known enumeration.
    pub fn from_code(code: i64) -> Result<Self, GatewayFault> {
        match code {
            901 => Ok(AuthorityStatus::Validated),
            902 => Ok(AuthorityStatus::Rejected),
            904 => Ok(AuthorityStatus::PendingValidation),
            905 => Ok(AuthorityStatus::Annulled),
            other => Err(GatewayFault::UnsupportedStatus { code: other }),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            AuthorityStatus::Validated => 901,
            AuthorityStatus::Rejected => 902,
            AuthorityStatus::PendingValidation => 904,
            AuthorityStatus::Annulled => 905,
        }
    }
}

/// Request for the code-issuance operation.
#[derive(Debug, Clone, Serialize)]
pub struct IssueCodeRequest {
    pub issuer_tax_id: u64,
    pub system_code: String,
    pub branch_code: u32,
    pub pos_code: u32,
    /// `"SOFTWARE"` or `"DAILY"`.
    pub code_kind: String,
    /// Owning software code value; required for daily issuance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_code: Option<String>,
    /// Local request instant, `YYYYMMDDHHmmssSSS`.
    pub requested_at: String,
}

/// Code fields returned by the issuance operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCode {
    pub code: String,
    pub control_code: String,
    /// Authority-declared validity start, `YYYYMMDDHHmmssSSS`.
    pub valid_from: String,
    /// Authority-declared validity end, `YYYYMMDDHHmmssSSS`.
    pub valid_until: String,
}

/// Invoice document envelope for the reception operation.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceEnvelope {
    pub issuer_tax_id: u64,
    pub branch_code: u32,
    pub pos_code: u32,
    pub sequence: u64,
    /// Computed unique code (CUF-equivalent).
    pub unique_code: String,
    /// Daily authorization code value in force at emission.
    pub daily_code: String,
    /// Emission instant, `YYYYMMDDHHmmssSSS`.
    pub issued_at: String,
    pub amount_cents: u64,
    pub customer_tax_id: String,
    pub customer_name: String,
    /// `1` online, `2` contingency.
    pub emission_type: u8,
    pub modality: u8,
    pub document_type: u8,
    pub sector_document: u8,
}

/// Outcome of a document submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub status: AuthorityStatus,
    pub reception_code: Option<String>,
    pub rejection_reasons: Vec<String>,
}

/// Reference fields for the document-query operation.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceQuery {
    pub issuer_tax_id: u64,
    pub branch_code: u32,
    pub pos_code: u32,
    pub sequence: u64,
    pub unique_code: String,
}

/// Request for the annulment operation.
#[derive(Debug, Clone, Serialize)]
pub struct AnnulmentRequest {
    pub issuer_tax_id: u64,
    pub branch_code: u32,
    pub pos_code: u32,
    pub sequence: u64,
    pub unique_code: String,
    /// Authority-published annulment motive code.
    pub reason_code: u32,
}

/// Status report from the query and annulment operations.
#[derive(Debug, Clone)]
pub struct InvoiceStatusReport {
    pub status: AuthorityStatus,
    pub reception_code: Option<String>,
    pub rejection_reasons: Vec<String>,
}

/// Raw response body shared by reception, query and annulment.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DocumentResponse {
    pub status_code: i64,
    #[serde(default)]
    pub reception_code: Option<String>,
    #[serde(default)]
    pub rejection_reasons: Vec<String>,
}

/// Fault envelope the authority returns on application-level errors.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FaultEnvelope {
    #[serde(default)]
    pub fault_code: Option<i64>,
    #[serde(default)]
    pub message: String,
}
