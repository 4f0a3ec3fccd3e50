use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Identifiers are trimmed and lower-cased before any uniqueness check or
/// storage, so `A@x.com` and ` a@x.com ` cannot create duplicate accounts.
pub fn sanitize(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// 10-digit Indian mobile number starting with 6-9; spaces and hyphens are
/// stripped before matching.
pub fn is_valid_phone_number(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();
    }
    let normalized: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    PHONE_RE.is_match(&normalized)
}

pub fn is_valid_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (2..=255).contains(&len)
}

pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_trims_and_lowercases() {
        assert_eq!(sanitize("  A@X.Com "), "a@x.com");
        assert_eq!(sanitize("9876543210"), "9876543210");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.tld"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("spaces in@x.com"));
    }

    #[test]
    fn phone_shape() {
        assert!(is_valid_phone_number("9876543210"));
        assert!(is_valid_phone_number("98765 43210"));
        assert!(is_valid_phone_number("98765-43210"));
        assert!(!is_valid_phone_number("1234567890")); // leading digit < 6
        assert!(!is_valid_phone_number("987654321")); // too short
        assert!(!is_valid_phone_number("98765432101")); // too long
    }

    #[test]
    fn name_bounds() {
        assert!(is_valid_name("Jo"));
        assert!(is_valid_name("  padded name  "));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name(&"x".repeat(256)));
        assert!(is_valid_name(&"x".repeat(255)));
    }

    #[test]
    fn password_minimum_length() {
        assert!(is_valid_password("secret"));
        assert!(!is_valid_password("short"));
    }
}
