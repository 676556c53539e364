//! Error types for the checksum codec.
//!
//! Every variant is a precondition violation: fatal to the current
//! operation, never retried, and always propagated to the caller
//! synchronously.

use thiserror::Error;

/// Checksum codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input contained something other than an ASCII digit.
    #[error("Non-digit character {found:?} at position {position}")]
    NonDigit { found: char, position: usize },

    /// Input digit string was empty.
    #[error("Empty digit string")]
    EmptyInput,

    /// A caller-supplied field does not fit its authority-fixed width.
    #[error("Field {field} value {value:?} exceeds fixed width {width}")]
    FieldTooWide {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// The assembled concatenation is not exactly the required length.
    #[error("Pre-checksum concatenation is {actual} characters, required {required}")]
    LengthMismatch { actual: usize, required: usize },

    /// Input was not a valid uppercase/lowercase hexadecimal numeral.
    #[error("Invalid hexadecimal input: {0:?}")]
    InvalidHex(String),

    /// Numeral exceeds the supported 256-bit range.
    #[error("Value {value:?} exceeds the supported numeral range")]
    Overflow { value: String },
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
