//! Phone number normalization for the supported country (Ethiopia, `+251`).
//!
//! Normalization runs on every keystroke, so it never rejects input; use
//! [`is_valid_phone`] to decide whether a number may be submitted.

/// Country calling code, without the leading `+`.
pub const COUNTRY_CODE: &str = "251";

/// National trunk prefix dropped when converting to the international form.
const TRUNK_PREFIX: char = '0';

/// Subscriber number length after the country code.
const SUBSCRIBER_DIGITS: usize = 9;

/// Normalize free-form phone input towards `+251XXXXXXXXX`.
///
/// Idempotent: normalizing an already-normalized string returns it unchanged.
pub fn normalize_phone(input: &str) -> String {
    let has_plus = input.trim_start().starts_with('+');
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with(TRUNK_PREFIX) && digits.len() == SUBSCRIBER_DIGITS + 1 {
        return format!("+{}{}", COUNTRY_CODE, &digits[1..]);
    }

    if digits.starts_with(COUNTRY_CODE) && digits.len() >= 10 {
        return format!("+{}", digits);
    }

    if has_plus {
        return format!("+{}", digits);
    }

    if digits.is_empty() {
        String::new()
    } else {
        format!("+{}", digits)
    }
}

/// True iff `phone` is exactly `+251` followed by nine digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone
        .strip_prefix('+')
        .and_then(|rest| rest.strip_prefix(COUNTRY_CODE))
        .map(|subscriber| {
            subscriber.len() == SUBSCRIBER_DIGITS
                && subscriber.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_prefix_replaced_with_country_code() {
        assert_eq!(normalize_phone("0912345678"), "+251912345678");
        assert!(is_valid_phone(&normalize_phone("0912345678")));
    }

    #[test]
    fn test_formatting_characters_stripped() {
        assert_eq!(normalize_phone("091 234-5678"), "+251912345678");
        assert_eq!(normalize_phone("(251) 91 234 5678"), "+251912345678");
        assert_eq!(normalize_phone("+251 91 234 5678"), "+251912345678");
    }

    #[test]
    fn test_country_code_without_plus() {
        assert_eq!(normalize_phone("251912345678"), "+251912345678");
    }

    #[test]
    fn test_partial_input_kept_while_typing() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("+"), "+");
        assert_eq!(normalize_phone("0"), "+0");
        assert_eq!(normalize_phone("091"), "+091");
        assert_eq!(normalize_phone("+25191"), "+25191");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn test_progressive_typing_reaches_canonical_form() {
        let mut field = String::new();
        for c in "0912345678".chars() {
            field.push(c);
            field = normalize_phone(&field);
        }
        assert_eq!(field, "+251912345678");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "+",
            "0",
            "09",
            "0912345678",
            "091234567",
            "09123456789",
            "251912345678",
            "+251912345678",
            "+1 (415) 555-1234",
            "12345",
            "  +251 91-234-5678 ",
            "phone: 0912345678",
        ];
        for input in inputs {
            let once = normalize_phone(input);
            assert_eq!(normalize_phone(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+251912345678"));
        assert!(is_valid_phone("+251712345678"));

        assert!(!is_valid_phone("251912345678"));
        assert!(!is_valid_phone("+25191234567"));
        assert!(!is_valid_phone("+2519123456789"));
        assert!(!is_valid_phone("+252912345678"));
        assert!(!is_valid_phone("+251 912345678"));
        assert!(!is_valid_phone("0912345678"));
        assert!(!is_valid_phone(""));
    }
}
