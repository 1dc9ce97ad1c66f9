use lazy_static::lazy_static;
use regex::Regex;

pub const PASSWORD_MIN_LEN: usize = 8;

/// Basic `local@domain.tld` shape check. Authoritative validation for every
/// write path; the smoke client mirrors it for early feedback.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.len() >= PASSWORD_MIN_LEN
}
