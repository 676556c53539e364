//! # fc-02-authorization-codes
//!
//! Store and issuance service for the two classes of rotating authorization
//! code the authority grants per sales point.
//!
//! ## Overview
//!
//! - **Software code**: long-lived, one per sales point, parent of daily
//!   codes.
//! - **Daily code**: short-lived, issued under the current software code;
//!   its control digest is appended to every unique invoice code.
//!
//! ```text
//! caller ──get_valid_daily_code──→ CodeService ──latest non-expired──→ CodeRepository
//!                                      │                                    ▲
//!                                      │ none valid                         │ persist + clip
//!                                      ▼                                    │
//!                              per-(sales point, kind) lock ──issue──→ CodeIssuer (gateway)
//! ```
//!
//! ## Invariants
//!
//! - At most one currently valid code of each kind per sales point.
//! - Codes are immutable after creation; supersession only clips the
//!   predecessor's end-of-validity to the successor's start. History is
//!   never deleted; superseded codes remain queryable by timestamp.
//! - Concurrent callers racing on an empty store trigger exactly one
//!   gateway issuance; losers wait on the keyed lock and reuse the result.
//! - A local clock drifting beyond the configured tolerance from the
//!   authority's declared validity start fails issuance outright.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::memory::InMemoryCodeRepository;
pub use adapters::snapshot::SnapshotCodeRepository;
pub use domain::AuthorizationCode;
pub use error::{CodeStoreError, CodeStoreResult};
pub use ports::outbound::{CodeIssuer, CodeRepository, IssuedCodeFields};
pub use service::{AuthorizationCodeService, CodeServiceConfig};
