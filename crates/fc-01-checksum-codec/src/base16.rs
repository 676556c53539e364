//! Exact base-10 / base-16 numeral conversion.
//!
//! The 54-digit pre-code numeral exceeds native 64-bit (and 128-bit) range,
//! so conversion runs through `U256`. Output is uppercase; leading zeros
//! beyond the numeric value itself do not survive the round trip.

use primitive_types::U256;

use crate::error::{CodecError, CodecResult};

/// Re-encode a decimal numeral as an uppercase hexadecimal numeral.
pub fn encode_base16(decimal: &str) -> CodecResult<String> {
    if decimal.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    if let Some(position) = decimal.chars().position(|c| !c.is_ascii_digit()) {
        return Err(CodecError::NonDigit {
            found: decimal.chars().nth(position).unwrap_or('?'),
            position,
        });
    }

    let value = U256::from_dec_str(decimal).map_err(|_| CodecError::Overflow {
        value: decimal.to_string(),
    })?;

    Ok(format!("{value:x}").to_uppercase())
}

/// Inverse of [`encode_base16`]: hexadecimal numeral back to decimal.
pub fn decode_base16(hex: &str) -> CodecResult<String> {
    if hex.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidHex(hex.to_string()));
    }

    let value =
        U256::from_str_radix(hex, 16).map_err(|_| CodecError::InvalidHex(hex.to_string()))?;

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(encode_base16("170").unwrap(), "AA");
        assert_eq!(decode_base16("AA").unwrap(), "170");
        assert_eq!(encode_base16("0").unwrap(), "0");
        assert_eq!(decode_base16("0").unwrap(), "0");
    }

    #[test]
    fn test_beyond_sixty_four_bits() {
        assert_eq!(
            encode_base16("123456789012345678901234567890").unwrap(),
            "18EE90FF6C373E0EE4E3F0AD2"
        );
        assert_eq!(
            decode_base16("18EE90FF6C373E0EE4E3F0AD2").unwrap(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn test_field_maximum_fifty_three_nines() {
        let max = "9".repeat(53);
        let hex = encode_base16(&max).unwrap();
        assert_eq!(hex, "10B46C6CDD6E3E0828F4DB456FF0C8E9FFFFFFFFFFFFF");
        assert_eq!(decode_base16(&hex).unwrap(), max);
    }

    #[test]
    fn test_inverse_law() {
        for decimal in [
            "1",
            "16",
            "255",
            "4294967296",
            "18446744073709551616",
            "000102345678920240701143025123000011101000000015800005",
        ] {
            let hex = encode_base16(decimal).unwrap();
            let trimmed = decimal.trim_start_matches('0');
            let expected = if trimmed.is_empty() { "0" } else { trimmed };
            assert_eq!(decode_base16(&hex).unwrap(), expected);
        }
    }

    #[test]
    fn test_lowercase_hex_accepted_on_decode() {
        assert_eq!(decode_base16("aa").unwrap(), "170");
    }

    #[test]
    fn test_rejects_non_digit_decimal() {
        assert!(matches!(
            encode_base16("12x4").unwrap_err(),
            CodecError::NonDigit { found: 'x', .. }
        ));
    }

    #[test]
    fn test_rejects_invalid_hex() {
        assert!(matches!(
            decode_base16("12G4").unwrap_err(),
            CodecError::InvalidHex(_)
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(encode_base16("").unwrap_err(), CodecError::EmptyInput);
        assert_eq!(decode_base16("").unwrap_err(), CodecError::EmptyInput);
    }
}
