//! API handlers and shared input helpers.

pub mod auth;
pub mod health;
pub mod posts;
pub mod root;
pub mod types;

pub use self::auth::{login, signup};
pub use self::health::health;
pub use self::posts::{create_post, delete_post, list_posts, update_post};
pub use self::root::root;

use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Passwords must carry at least [`MIN_PASSWORD_LENGTH`] characters.
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}


#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@x.com"));
        assert!(valid_email("name.surname@example.co"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@x.com"));
    }

    #[test]
    fn valid_password_counts_characters() {
        assert!(valid_password("secret"));
        assert!(valid_password("ñññññññ"));
        assert!(!valid_password("short"));
        assert!(!valid_password(""));
    }
}
