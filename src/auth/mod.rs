//! Authentication: bearer-token resolution, password hashing, account
//! handlers for both roles.

pub mod handlers;
pub mod middleware;
pub mod password;

pub use middleware::{CurrentAdmin, CurrentStudent};

use rand::Rng;

use crate::config;

/// Generate a fresh opaque access token (lowercase alphanumeric).
///
/// Tokens are long-lived and single-valued per account: each login
/// overwrites the stored one, invalidating the previous session.
pub fn generate_access_token() -> String {
    let mut rng = rand::rng();
    (0..config::ACCESS_TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_access_token();
        assert_eq!(token.len(), config::ACCESS_TOKEN_LENGTH);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_tokens_are_not_repeated() {
        assert_ne!(generate_access_token(), generate_access_token());
    }
}
