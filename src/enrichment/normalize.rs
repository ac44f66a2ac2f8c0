//! Identifier normalization.
//!
//! Canonicalizes phone numbers and email addresses into stable lookup keys
//! so that differently formatted inputs for the same subscriber match.
//! Normalization is total and idempotent.

/// Normalizes a phone number for matching.
///
/// Strips everything except digits, then keeps the last 10 digits. This
/// deliberately drops country-code prefixes so all of these collapse to
/// the same key:
///
/// - `"+1 (918) 625-7838"` → `"9186257838"`
/// - `"+19186257838"` → `"9186257838"`
/// - `"918-625-7838"` → `"9186257838"`
///
/// Inputs with fewer than 10 digits (short codes, partial numbers) are
/// returned as their bare digits rather than rejected.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

/// Normalizes an address (phone or email) for index lookup.
///
/// Empty input yields an empty string. Anything containing `@` is treated
/// as an email and only trimmed and lowercased; everything else goes
/// through [`normalize_phone`].
#[must_use]
pub fn normalize_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let trimmed = address.trim().to_lowercase();
    if trimmed.contains('@') {
        return trimmed;
    }
    normalize_phone(&trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("+1 (918) 625-7838"; "formatted with country code")]
    #[test_case("+19186257838"; "e164")]
    #[test_case("918-625-7838"; "dashed")]
    #[test_case("9186257838"; "bare")]
    #[test_case("1-918-625-7838"; "dashed with country code")]
    fn test_phone_formats_collapse(input: &str) {
        assert_eq!(normalize_phone(input), "9186257838");
    }

    #[test]
    fn test_short_numbers_preserved() {
        assert_eq!(normalize_phone("86753"), "86753");
        assert_eq!(normalize_phone("911"), "911");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_long_international_keeps_last_ten() {
        // 12 significant digits: only the last 10 survive
        assert_eq!(normalize_phone("+44 7911 123456"), "7911123456");
    }

    #[test]
    fn test_address_email_passthrough() {
        assert_eq!(normalize_address("  Alice@Example.COM "), "alice@example.com");
        // Emails with digits must not be phone-normalized
        assert_eq!(normalize_address("a1234567890@example.com"), "a1234567890@example.com");
    }

    #[test]
    fn test_address_empty() {
        assert_eq!(normalize_address(""), "");
    }

    #[test]
    fn test_address_phone_delegates() {
        assert_eq!(normalize_address("+1 (918) 625-7838"), "9186257838");
    }

    #[test]
    fn test_idempotent() {
        for input in ["+1 (918) 625-7838", "Bob@Example.com", "911", ""] {
            let once = normalize_address(input);
            assert_eq!(normalize_address(&once), once);
        }
    }
}
