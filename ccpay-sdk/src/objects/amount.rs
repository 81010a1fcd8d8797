//! Base-unit amount helpers.
//!
//! Amounts stay decimal strings end to end: 18-decimal tokens overflow
//! `u64` after about 18 whole units, so nothing here parses into a
//! fixed-width integer.

use super::ValidationError;

/// Check that `amount` is a non-empty run of ASCII digits.
pub fn validate_base_amount(amount: &str) -> Result<&str, ValidationError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidBaseAmount(amount.to_string()));
    }
    Ok(amount)
}

/// Render a base-unit amount in display units at full precision.
///
/// Trailing zeros are trimmed and a zero fraction drops the decimal point.
/// Input that is not a digit string is returned unchanged.
pub fn format_amount(amount_base: &str, decimals: u32) -> String {
    format_amount_truncated(amount_base, decimals, decimals)
}

/// Like [`format_amount`], but keeps at most `max_fraction` fractional
/// digits (truncating, not rounding).
pub fn format_amount_truncated(amount_base: &str, decimals: u32, max_fraction: u32) -> String {
    let Ok(digits) = validate_base_amount(amount_base) else {
        return amount_base.to_string();
    };
    let digits = digits.trim_start_matches('0');
    let decimals = decimals as usize;

    let (whole, fraction) = if digits.len() > decimals {
        let (w, f) = digits.split_at(digits.len() - decimals);
        (w.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let keep = (max_fraction as usize).min(fraction.len());
    let fraction = fraction[..keep].trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1000000000000000000", 18), "1");
        assert_eq!(format_amount("1500000000000000000", 18), "1.5");
        assert_eq!(format_amount("1000000000000000", 18), "0.001");
        assert_eq!(format_amount("0", 18), "0");
        assert_eq!(format_amount("000120", 2), "1.2");
        assert_eq!(format_amount("42", 0), "42");
    }

    #[test]
    fn test_format_amount_beyond_u128() {
        let amount = "123456789012345678901234567890123456789012345678901";
        assert_eq!(
            format_amount(amount, 18),
            "123456789012345678901234567890123.456789012345678901"
        );
    }

    #[test]
    fn test_format_amount_truncated() {
        assert_eq!(format_amount_truncated("1234567890123456789", 18, 6), "1.234567");
        assert_eq!(format_amount_truncated("1000000100000000000", 18, 6), "1");
        assert_eq!(format_amount_truncated("500000000000000000", 18, 6), "0.5");
    }

    #[test]
    fn test_invalid_amount_passthrough() {
        assert_eq!(format_amount("", 18), "");
        assert_eq!(format_amount("-5", 18), "-5");
        assert_eq!(format_amount("1e18", 18), "1e18");
        assert!(validate_base_amount("12a").is_err());
        assert!(validate_base_amount("0012").is_ok());
    }
}
