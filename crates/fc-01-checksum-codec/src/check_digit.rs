//! Modulus-11 check digit.
//!
//! The authority publishes the same check-digit scheme in two forms; both
//! are weighted sums with weights cycling 2..=9 from the rightmost digit,
//! differing only in how the sum is folded into a single digit.

use crate::error::{CodecError, CodecResult};

/// Which published folding of the modulus-11 sum to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mod11Variant {
    /// `11 - (sum mod 11)`, mapped `11 -> 0` and `10 -> 1`. Used for the
    /// unique invoice code.
    #[default]
    Standard,
    /// `((sum * 10) mod 11) mod 10`. Appears in other authority artifacts
    /// (sequence check columns); diverges from `Standard` exactly when the
    /// weighted sum is congruent to 1 modulo 11.
    TimesTen,
}

/// Compute the modulus-11 check digit of a digit string.
///
/// Weights cycle 2, 3, .. 9 and restart at 2, assigned right-to-left.
/// Non-digit input is a precondition violation.
pub fn compute_check_digit(digits: &str, variant: Mod11Variant) -> CodecResult<char> {
    if digits.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let mut sum: u64 = 0;
    for (offset, ch) in digits.chars().rev().enumerate() {
        let value = ch.to_digit(10).ok_or(CodecError::NonDigit {
            found: ch,
            // report the position as written, not the reversed offset
            position: digits.chars().count() - 1 - offset,
        })? as u64;
        let weight = 2 + (offset as u64 % 8);
        sum += value * weight;
    }

    let digit = match variant {
        Mod11Variant::Standard => match 11 - (sum % 11) {
            11 => 0,
            10 => 1,
            d => d,
        },
        Mod11Variant::TimesTen => ((sum * 10) % 11) % 10,
    };

    Ok(char::from(b'0' + digit as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digits_standard() {
        // weighted sums verified by hand: 12345 -> 50, 724 -> 42,
        // 9876543210 -> 239
        assert_eq!(
            compute_check_digit("12345", Mod11Variant::Standard).unwrap(),
            '5'
        );
        assert_eq!(
            compute_check_digit("724", Mod11Variant::Standard).unwrap(),
            '2'
        );
        assert_eq!(
            compute_check_digit("9876543210", Mod11Variant::Standard).unwrap(),
            '3'
        );
    }

    #[test]
    fn test_sum_divisible_by_eleven_maps_to_zero() {
        // "00" has weighted sum 0; 11 - 0 mod 11 folds to 11 -> '0'
        assert_eq!(
            compute_check_digit("00", Mod11Variant::Standard).unwrap(),
            '0'
        );
    }

    #[test]
    fn test_variants_diverge_when_sum_is_one_mod_eleven() {
        // "6" -> weighted sum 12, 12 mod 11 == 1: Standard folds 10 -> '1',
        // TimesTen folds (120 mod 11) mod 10 == 10 mod 10 -> '0'
        assert_eq!(
            compute_check_digit("6", Mod11Variant::Standard).unwrap(),
            '1'
        );
        assert_eq!(
            compute_check_digit("6", Mod11Variant::TimesTen).unwrap(),
            '0'
        );
    }

    #[test]
    fn test_variants_agree_otherwise() {
        for input in ["12345", "724", "9876543210", "00", "0"] {
            assert_eq!(
                compute_check_digit(input, Mod11Variant::Standard).unwrap(),
                compute_check_digit(input, Mod11Variant::TimesTen).unwrap(),
                "variants should agree on {input}"
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let a = compute_check_digit("0042137", Mod11Variant::Standard).unwrap();
        let b = compute_check_digit("0042137", Mod11Variant::Standard).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_non_digit() {
        let err = compute_check_digit("12a45", Mod11Variant::Standard).unwrap_err();
        assert_eq!(
            err,
            CodecError::NonDigit {
                found: 'a',
                position: 2
            }
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            compute_check_digit("", Mod11Variant::Standard).unwrap_err(),
            CodecError::EmptyInput
        );
    }
}
