//! State transition table.
//!
//! Transitions are monotonic; `ACCEPTED -> ANNULLED` is the sole allowed
//! backward move. Everything not listed here is a precondition violation.

use shared_types::InvoiceState;

use crate::error::{LifecycleError, LifecycleResult};

/// Validate a state change against the transition table.
pub fn validate_transition(from: InvoiceState, to: InvoiceState) -> LifecycleResult<()> {
    use InvoiceState::*;

    let allowed = matches!(
        (from, to),
        (Draft, Submitted)
            | (Submitted, Accepted)
            | (Submitted, Rejected)
            | (Submitted, Error)
            | (Accepted, Annulled)
            | (Error, ExpiredContingency)
    );

    if allowed {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceState::*;

    #[test]
    fn test_forward_path_is_legal() {
        validate_transition(Draft, Submitted).unwrap();
        validate_transition(Submitted, Accepted).unwrap();
        validate_transition(Submitted, Rejected).unwrap();
        validate_transition(Submitted, Error).unwrap();
        validate_transition(Accepted, Annulled).unwrap();
        validate_transition(Error, ExpiredContingency).unwrap();
    }

    #[test]
    fn test_no_retry_into_terminal_records() {
        for (from, to) in [
            (Rejected, Submitted),
            (Error, Submitted),
            (Annulled, Accepted),
            (ExpiredContingency, Submitted),
        ] {
            assert!(
                validate_transition(from, to).is_err(),
                "{from} -> {to} must be rejected"
            );
        }
    }

    #[test]
    fn test_draft_never_skips_submission() {
        for to in [Accepted, Rejected, Error, Annulled, ExpiredContingency] {
            assert!(validate_transition(Draft, to).is_err());
        }
    }

    #[test]
    fn test_annulment_only_from_accepted() {
        for from in [Draft, Submitted, Rejected, Error, ExpiredContingency] {
            assert!(validate_transition(from, Annulled).is_err());
        }
    }
}
