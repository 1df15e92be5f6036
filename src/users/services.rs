use lazy_static::lazy_static;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// At least 6 characters with at least one letter and one digit.
pub(crate) fn is_valid_password(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Gravatar-style URL derived from the email, 250px, robohash fallback for
/// addresses without a registered avatar.
pub(crate) fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=250&d=robohash",
        hex::encode(digest)
    )
}

/// Opaque single-use secret mailed out at signup. 128 bits, hex-encoded.
pub(crate) fn new_verification_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub(crate) fn verification_url(base_url: &str, token: &str) -> String {
    format!("{}/api/users/verify/{}", base_url.trim_end_matches('/'), token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn password_rules() {
        assert!(is_valid_password("abc123"));
        assert!(!is_valid_password("abc12"));
        assert!(!is_valid_password("abcdef"));
        assert!(!is_valid_password("123456"));
    }

    #[test]
    fn gravatar_url_is_stable_and_case_insensitive() {
        let a = gravatar_url("A@X.com");
        let b = gravatar_url(" a@x.com ");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=250&d=robohash"));
    }

    #[test]
    fn verification_tokens_are_unique_and_opaque() {
        let a = new_verification_token();
        let b = new_verification_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verification_url_shape() {
        assert_eq!(
            verification_url("http://localhost:8080/", "tok"),
            "http://localhost:8080/api/users/verify/tok"
        );
    }
}
