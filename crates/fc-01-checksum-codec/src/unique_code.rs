//! Unique invoice code assembly.
//!
//! The authority fixes both the field order and the width of every field.
//! The pre-checksum concatenation must be exactly [`PRE_CHECKSUM_LEN`]
//! characters; anything else is a caller error and aborts the build.

use shared_types::{authority_timestamp, EmissionMode, Timestamp};

use crate::base16::encode_base16;
use crate::check_digit::{compute_check_digit, Mod11Variant};
use crate::error::{CodecError, CodecResult};

/// Field widths in authority order. The 17-character timestamp width is
/// fixed by its wire format rather than by padding.
const WIDTH_TAX_ID: usize = 13;
const WIDTH_BRANCH: usize = 4;
const WIDTH_MODALITY: usize = 1;
const WIDTH_EMISSION: usize = 1;
const WIDTH_DOCUMENT_TYPE: usize = 1;
const WIDTH_SECTOR_DOCUMENT: usize = 2;
const WIDTH_SEQUENCE: usize = 10;
const WIDTH_POS: usize = 4;

/// Required length of the zero-padded field concatenation, before the
/// check digit is appended.
pub const PRE_CHECKSUM_LEN: usize = 53;

/// Invoicing modality declared to the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Invoices signed and emitted electronically.
    Electronic,
    /// Invoices produced by an authorized computerized system.
    Computerized,
}

impl Modality {
    /// Single-digit wire code used in envelopes and the unique invoice code.
    pub fn wire_code(self) -> u8 {
        match self {
            Modality::Electronic => 1,
            Modality::Computerized => 2,
        }
    }

    fn wire_digit(self) -> char {
        char::from(b'0' + self.wire_code())
    }
}

/// Inputs to the unique code, in the authority's field order.
///
/// All numeric fields are zero-padded to their fixed width; a value wider
/// than its field is rejected, never truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueCodeFields {
    /// Issuer tax identifier (up to 13 digits).
    pub issuer_tax_id: u64,
    /// Invoice issue instant; rendered as `YYYYMMDDHHmmssSSS`.
    pub issued_at: Timestamp,
    /// Branch code (up to 4 digits).
    pub branch_code: u32,
    /// Invoicing modality.
    pub modality: Modality,
    /// Online or contingency emission.
    pub emission_mode: EmissionMode,
    /// Document/adjustment type (single digit).
    pub document_type: u8,
    /// Sector document type (up to 2 digits).
    pub sector_document: u8,
    /// Invoice sequence number (up to 10 digits).
    pub sequence: u64,
    /// Point-of-sale code (up to 4 digits).
    pub pos_code: u32,
}

fn pad(field: &'static str, value: String, width: usize) -> CodecResult<String> {
    if value.len() > width {
        return Err(CodecError::FieldTooWide {
            field,
            value,
            width,
        });
    }
    Ok(format!("{value:0>width$}"))
}

/// Assemble the zero-padded 53-character concatenation.
fn concatenate(fields: &UniqueCodeFields) -> CodecResult<String> {
    let mut out = String::with_capacity(PRE_CHECKSUM_LEN);
    out.push_str(&pad(
        "issuer_tax_id",
        fields.issuer_tax_id.to_string(),
        WIDTH_TAX_ID,
    )?);
    // The timestamp's width comes from its format, not from padding; a
    // malformed rendering is caught by the final length assertion.
    out.push_str(&authority_timestamp(fields.issued_at));
    out.push_str(&pad(
        "branch_code",
        fields.branch_code.to_string(),
        WIDTH_BRANCH,
    )?);
    out.push(fields.modality.wire_digit());
    out.push(fields.emission_mode.wire_digit());
    out.push_str(&pad(
        "document_type",
        fields.document_type.to_string(),
        WIDTH_DOCUMENT_TYPE,
    )?);
    out.push_str(&pad(
        "sector_document",
        fields.sector_document.to_string(),
        WIDTH_SECTOR_DOCUMENT,
    )?);
    out.push_str(&pad("sequence", fields.sequence.to_string(), WIDTH_SEQUENCE)?);
    out.push_str(&pad("pos_code", fields.pos_code.to_string(), WIDTH_POS)?);

    if out.len() != PRE_CHECKSUM_LEN {
        return Err(CodecError::LengthMismatch {
            actual: out.len(),
            required: PRE_CHECKSUM_LEN,
        });
    }
    Ok(out)
}

/// Derive the unique invoice code.
///
/// Concatenates the padded fields, appends the standard mod-11 check digit,
/// re-encodes the 54-digit numeral in base 16 and appends the daily code's
/// control digest. Deterministic: identical inputs reproduce the identical
/// code byte for byte.
pub fn build_unique_code(fields: &UniqueCodeFields, control_code: &str) -> CodecResult<String> {
    let concatenated = concatenate(fields)?;
    let check = compute_check_digit(&concatenated, Mod11Variant::Standard)?;

    let mut numeral = concatenated;
    numeral.push(check);

    let mut code = encode_base16(&numeral)?;
    code.push_str(control_code);
    Ok(code)
}
