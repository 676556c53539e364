//! # Core Domain Entities
//!
//! Identity and state types shared by the authorization-code store, the
//! authority gateway, the invoice lifecycle and the contingency regularizer.
//!
//! ## Clusters
//!
//! - **Identity**: `SalesPoint`, `InvoiceRef`
//! - **Authorization**: `CodeKind`
//! - **Lifecycle**: `InvoiceState`, `EmissionMode`

use serde::{Deserialize, Serialize};
use std::fmt;

/// A till/terminal identity: branch plus point-of-sale.
///
/// Immutable once registered. Authorization codes and invoice sequences are
/// scoped per sales point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesPoint {
    /// Branch (sucursal) code assigned by the authority.
    pub branch_code: u32,
    /// Point-of-sale code within the branch.
    pub pos_code: u32,
}

impl SalesPoint {
    pub fn new(branch_code: u32, pos_code: u32) -> Self {
        Self {
            branch_code,
            pos_code,
        }
    }
}

impl fmt::Display for SalesPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch_code, self.pos_code)
    }
}

/// Reference to a persisted invoice: `(branch, sequence)`.
///
/// Sequence numbers are strictly monotonic per branch/sales point and are
/// never reused, including after rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceRef {
    pub branch_code: u32,
    pub sequence: u64,
}

impl InvoiceRef {
    pub fn new(branch_code: u32, sequence: u64) -> Self {
        Self {
            branch_code,
            sequence,
        }
    }
}

impl fmt::Display for InvoiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.branch_code, self.sequence)
    }
}

/// The two classes of rotating authorization code issued by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeKind {
    /// Long-lived code issued per sales point; parent of daily codes.
    Software,
    /// Short-lived code issued under a software code; its control digest is
    /// appended to every unique invoice code computed while it is valid.
    Daily,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKind::Software => write!(f, "software"),
            CodeKind::Daily => write!(f, "daily"),
        }
    }
}

/// How an invoice was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionMode {
    /// Emitted while the authority was reachable.
    Online,
    /// Emitted (or re-emitted) while the authority was unreachable; subject
    /// to regularization within the authority's deadline.
    Contingency,
}

impl EmissionMode {
    /// Single-digit wire code used in envelopes and the unique invoice code.
    pub fn wire_code(self) -> u8 {
        match self {
            EmissionMode::Online => 1,
            EmissionMode::Contingency => 2,
        }
    }

    /// The wire code as a character, for fixed-width concatenation.
    pub fn wire_digit(self) -> char {
        char::from(b'0' + self.wire_code())
    }
}

/// Invoice lifecycle states.
///
/// ```text
/// DRAFT ──→ SUBMITTED ──→ ACCEPTED ──→ ANNULLED
///                │
///                ├──────→ REJECTED
///                └──────→ ERROR ──(regularizer, past deadline)──→ EXPIRED_CONTINGENCY
/// ```
///
/// Transitions are monotonic; `ACCEPTED → ANNULLED` is the only backward
/// move. The transition table itself is enforced by the lifecycle subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceState {
    /// Persisted locally, not yet dispatched.
    Draft,
    /// Dispatch recorded; the authority's verdict is not yet known.
    Submitted,
    /// Authority accepted; reception code stored.
    Accepted,
    /// Authority rejected; reasons stored verbatim.
    Rejected,
    /// Gateway fault during submission; queued for regularization.
    Error,
    /// Explicitly annulled after acceptance.
    Annulled,
    /// Contingency member left unresolved past the regularization deadline.
    /// Requires manual operator reconciliation.
    ExpiredContingency,
}

impl InvoiceState {
    /// States from which no automatic transition will ever occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvoiceState::Rejected | InvoiceState::Annulled | InvoiceState::ExpiredContingency
        )
    }

    /// Whether a status query must go to the authority rather than the
    /// local store. Only mid-flight invoices need a network refresh.
    pub fn needs_refresh(self) -> bool {
        matches!(self, InvoiceState::Submitted)
    }
}

impl fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvoiceState::Draft => "DRAFT",
            InvoiceState::Submitted => "SUBMITTED",
            InvoiceState::Accepted => "ACCEPTED",
            InvoiceState::Rejected => "REJECTED",
            InvoiceState::Error => "ERROR",
            InvoiceState::Annulled => "ANNULLED",
            InvoiceState::ExpiredContingency => "EXPIRED_CONTINGENCY",
        };
        write!(f, "{s}")
    }
}
