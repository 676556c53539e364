//! # Error Types
//!
//! Fault taxonomy shared across subsystems.
//!
//! The gateway's typed fault set lives here because both the
//! authorization-code store and the invoice lifecycle make decisions on it:
//! `ServiceUnavailable` opens the contingency path, `ProtocolFault` is
//! surfaced to the operator without retry, and `UnsupportedStatus` must
//! never be coerced into a nearby known state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Faults raised by the authority gateway, normalized from transport and
/// application failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GatewayFault {
    /// Transport-level failure: unreachable host, connect failure, timeout.
    #[error("Authority service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// The authority answered with a fault response, or the payload did not
    /// parse. Resubmitting the same request wastes a sequence number, so
    /// callers must not retry automatically.
    #[error("Authority protocol fault{}: {message}", .fault_code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    ProtocolFault {
        fault_code: Option<i64>,
        message: String,
    },

    /// The authority returned a status code outside the known enumeration.
    /// Surfaced verbatim so operators can extend support.
    #[error("Unsupported authority status code {code}")]
    UnsupportedStatus { code: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_fault_display_includes_code() {
        let fault = GatewayFault::ProtocolFault {
            fault_code: Some(998),
            message: "malformed envelope".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "Authority protocol fault (code 998): malformed envelope"
        );
    }

    #[test]
    fn test_protocol_fault_display_without_code() {
        let fault = GatewayFault::ProtocolFault {
            fault_code: None,
            message: "unparseable response body".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "Authority protocol fault: unparseable response body"
        );
    }
}
