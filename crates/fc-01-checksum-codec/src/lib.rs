//! # fc-01-checksum-codec
//!
//! Pure functions deriving the unique invoice code from authority-mandated
//! fields. No I/O, no state; every function is deterministic.
//!
//! ## Pipeline
//!
//! ```text
//! fields ──pad to fixed widths──→ 53-digit numeral
//!                                      │
//!                                      ├── mod-11 check digit ──→ 54-digit numeral
//!                                      │
//!                                      └──────────→ base-16 re-encode ──→ hex
//!                                                                          │
//!                                          daily code control digest ──────┤
//!                                                                          ▼
//!                                                                   unique code
//! ```
//!
//! ## Invariants
//!
//! - Identical fields always reproduce a byte-identical code.
//! - A field exceeding its fixed width, or a concatenation whose length is
//!   not exactly 53, aborts with a precondition error. Nothing is ever
//!   truncated or silently padded.
//! - `encode_base16`/`decode_base16` are exact inverses over the numeric
//!   value for every numeral up to the 54-digit maximum.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fc_01_checksum_codec::{build_unique_code, UniqueCodeFields};
//!
//! let code = build_unique_code(&fields, "F60A1E2B3C4D")?;
//! assert_eq!(code, build_unique_code(&fields, "F60A1E2B3C4D")?);
//! ```

pub mod base16;
pub mod check_digit;
pub mod error;
pub mod unique_code;

pub use base16::{decode_base16, encode_base16};
pub use check_digit::{compute_check_digit, Mod11Variant};
pub use error::{CodecError, CodecResult};
pub use unique_code::{build_unique_code, Modality, UniqueCodeFields, PRE_CHECKSUM_LEN};
