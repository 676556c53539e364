//! Contingency batch entities.

use serde::{Deserialize, Serialize};
use shared_types::{InvoiceRef, Timestamp};
use uuid::Uuid;

/// How a batch member was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberResolution {
    /// Not yet regularized.
    Pending,
    /// Re-emitted as `replacement`, which reached a settled state.
    Regularized { replacement: InvoiceRef },
    /// Deadline lapsed before regularization; flagged for manual action.
    Expired,
}

impl MemberResolution {
    pub fn is_pending(self) -> bool {
        matches!(self, MemberResolution::Pending)
    }
}

/// One invoice captured while the authority was unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMember {
    pub invoice: InvoiceRef,
    pub recorded_at: Timestamp,
    pub resolution: MemberResolution,
}

/// A group of offline emissions sharing one regularization deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyBatch {
    pub id: Uuid,
    pub opened_at: Timestamp,
    /// Authority-mandated regularization deadline, fixed at open time.
    pub deadline: Timestamp,
    pub members: Vec<BatchMember>,
    pub closed_at: Option<Timestamp>,
}

impl ContingencyBatch {
    pub fn open(opened_at: Timestamp, deadline: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            opened_at,
            deadline,
            members: Vec::new(),
            closed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Whether every member reached a resolution (regularized or expired).
    pub fn all_resolved(&self) -> bool {
        self.members.iter().all(|m| !m.resolution.is_pending())
    }

    /// Pending member references.
    pub fn pending_members(&self) -> Vec<InvoiceRef> {
        self.members
            .iter()
            .filter(|m| m.resolution.is_pending())
            .map(|m| m.invoice)
            .collect()
    }
}
