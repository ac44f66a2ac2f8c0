//! Property-based tests for address normalization.
//!
//! Normalization is the keystone of contact resolution: every address on
//! both sides of the index goes through it, so it has to be total and
//! idempotent for arbitrary input.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bluebubbles_mcp::{normalize_address, normalize_phone};
use proptest::prelude::*;

proptest! {
    /// Normalizing twice gives the same result as normalizing once.
    #[test]
    fn normalize_address_is_idempotent(input in ".{0,40}") {
        let once = normalize_address(&input);
        let twice = normalize_address(&once);
        prop_assert_eq!(once, twice);
    }

    /// Phone normalization never panics and emits only ASCII digits.
    #[test]
    fn normalize_phone_emits_only_digits(input in ".{0,40}") {
        let normalized = normalize_phone(&input);
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
        prop_assert!(normalized.len() <= 10 || input.chars().filter(char::is_ascii_digit).count() < 10);
    }

    /// Ten-or-more digit numbers collapse to their last ten digits no
    /// matter how they are formatted.
    #[test]
    fn formatting_does_not_change_long_numbers(digits in "[0-9]{10,15}") {
        let plain = normalize_phone(&digits);
        let dashed: String = digits
            .chars()
            .flat_map(|c| [c, '-'])
            .collect();
        let spaced = format!("+{} ({})", &digits[..3], &digits[3..]);

        prop_assert_eq!(&plain, &normalize_phone(&dashed));
        prop_assert_eq!(&plain, &normalize_phone(&spaced));
        prop_assert_eq!(plain.len(), 10);
    }

    /// Emails are trimmed and lowercased, never digit-stripped.
    #[test]
    fn emails_keep_their_shape(local in "[a-zA-Z0-9]{1,10}", domain in "[a-zA-Z0-9]{1,10}") {
        let email = format!("  {local}@{domain}.com ");
        let normalized = normalize_address(&email);
        prop_assert_eq!(normalized, email.trim().to_lowercase());
    }
}
