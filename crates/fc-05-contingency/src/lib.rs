//! # fc-05-contingency
//!
//! Batch recovery path for invoices emitted while the authority was
//! unreachable.
//!
//! ## Overview
//!
//! ```text
//! lifecycle (4) ──record_offline_emission──→ RegularizerService
//!                                                 │
//!                 interval tick ──→ sweep ────────┤
//!                                                 ├── past deadline ──→ mark expired
//!                                                 └── pending ──→ mpsc queue ──→ worker
//!                                                                                 │
//!                                                              bounded retry, fixed backoff
//!                                                                                 │
//!                                                          resubmit via lifecycle (4)
//! ```
//!
//! ## Invariants
//!
//! - At most one batch is open at a time; offline emissions append to it.
//! - The regularization deadline is captured into the batch when it opens;
//!   later configuration changes never extend an already open batch.
//! - Members left unresolved past the deadline are flagged expired: a
//!   distinct terminal state requiring manual operator action, never
//!   silently merged into the error pool or dropped.
//! - A batch closes only when no member is left pending.
//! - The sweep runs independently of request-driven submissions and
//!   tolerates them happening concurrently.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod scheduler;
pub mod service;

pub use adapters::memory::InMemoryBatchRepository;
pub use domain::{BatchMember, ContingencyBatch, MemberResolution};
pub use error::{RegularizerError, RegularizerResult};
pub use ports::outbound::{BatchRepository, RegularizationOutcome, Resubmitter};
pub use scheduler::{spawn_regularizer, RegularizerHandle};
pub use service::{RegularizationJob, RegularizerConfig, RegularizerService, SweepReport};
