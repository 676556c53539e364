//! # fc-04-invoice-lifecycle
//!
//! The invoice lifecycle controller: builds the document envelope, derives
//! the unique code, submits through the authority gateway, owns the state
//! machine, and exposes the only entry points the surrounding application
//! may call.
//!
//! ## State Machine
//!
//! ```text
//! DRAFT ──→ SUBMITTED ──→ ACCEPTED ──→ ANNULLED
//!                │
//!                ├──────→ REJECTED
//!                └──────→ ERROR ──(regularizer)──→ EXPIRED_CONTINGENCY
//! ```
//!
//! - `DRAFT → SUBMITTED` is recorded *before* the gateway call, so a crash
//!   mid-dispatch is recovered by querying, never by resubmitting the same
//!   unique code.
//! - A gateway fault during submission flips the invoice to `ERROR`, turns
//!   its emission mode to contingency and appends it to the open
//!   contingency batch.
//! - On an ambiguous timeout the invoice stays `SUBMITTED`; a later query
//!   resolves the true outcome.
//! - Annulment is legal only from `ACCEPTED`; every other state fails fast
//!   with a named precondition error.
//! - Contingency resubmission always creates a new invoice with a fresh
//!   sequence and unique code; it never retries into the same record.
//!
//! ## Concurrency
//!
//! State transitions are serialized per invoice reference through a keyed
//! async mutex, so a concurrent query refresh and an annulment cannot
//! interleave into an inconsistent state.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::memory::InMemoryInvoiceRepository;
pub use domain::invoice::FiscalInvoice;
pub use domain::transitions::validate_transition;
pub use error::{LifecycleError, LifecycleResult};
pub use ports::inbound::{EmissionApi, TransactionDetails};
pub use ports::outbound::{
    CodeProvider, ContingencyLog, EmissionCodes, InvoiceRenderer, InvoiceRepository,
    PaymentResolver, RenderedBinder, ResolvedPayment,
};
pub use service::{EmissionConfig, EmissionService};
