//! The fiscal invoice entity.

use serde::{Deserialize, Serialize};
use shared_types::{EmissionMode, InvoiceRef, InvoiceState, SalesPoint, Timestamp};

/// A fiscal invoice as persisted.
///
/// The unique code is computed once at creation and never recomputed for
/// an existing record; it is a deterministic function of the fields, so a
/// recomputation must reproduce it byte for byte. `state` (plus the audit
/// fields fed by state changes) is the only thing that mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalInvoice {
    /// Owning sales point (branch + point of sale).
    pub sales_point: SalesPoint,
    /// Strictly monotonic per sales point, never reused.
    pub sequence: u64,
    /// Emission instant used inside the unique code.
    pub issued_at: Timestamp,
    /// Computed unique code (CUF-equivalent). Immutable.
    pub unique_code: String,
    /// Authority-assigned reception code; set on acceptance.
    pub reception_code: Option<String>,
    /// Invoice total in minor currency units.
    pub amount_cents: u64,
    /// Customer tax identifier, as printed on the invoice.
    pub customer_tax_id: String,
    /// Customer display name.
    pub customer_name: String,
    /// Online or contingency.
    pub emission_mode: EmissionMode,
    /// Lifecycle state.
    pub state: InvoiceState,
    /// Last instant the authority was asked about this invoice.
    pub last_checked_at: Option<Timestamp>,
    /// Authority rejection reasons, verbatim.
    pub rejection_reasons: Vec<String>,
    /// Replacement invoice created by contingency regularization.
    pub regularized_as: Option<InvoiceRef>,
}

impl FiscalInvoice {
    /// Reference key `(branch, sequence)`.
    pub fn invoice_ref(&self) -> InvoiceRef {
        InvoiceRef::new(self.sales_point.branch_code, self.sequence)
    }
}
