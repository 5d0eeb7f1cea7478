//! Phone number canonicalization.
//!
//! The contact directory and every identifier comparison use the same key
//! space: the decimal digits of the input, in order.

/// Strips everything but ASCII digits.
///
/// `"+1 (415) 555-1234"` becomes `"14155551234"`. Email handles and other
/// non-numeric identifiers normalize to an empty string.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
