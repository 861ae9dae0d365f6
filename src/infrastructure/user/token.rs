//! Session-persistence token generation
//!
//! Remember tokens are random, URL-safe strings handed to the client once.
//! Only their SHA-256 digest is stored.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

const DIGEST_PREFIX: &str = "sha256$";

/// Fewest random bytes a remember token may carry
pub const MIN_TOKEN_BYTES: usize = 16;

/// A freshly issued token and the digest to persist for it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plaintext token; returned to the caller and never stored
    pub token: String,
    pub digest: String,
}

/// Generator and verifier for remember tokens
#[derive(Debug, Clone)]
pub struct TokenDigester {
    token_bytes: usize,
}

impl TokenDigester {
    pub fn new() -> Self {
        Self { token_bytes: 32 }
    }

    /// Set the number of random bytes per token, never below `MIN_TOKEN_BYTES`
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes.max(MIN_TOKEN_BYTES);
        self
    }

    pub fn issue(&self) -> IssuedToken {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let token = URL_SAFE_NO_PAD.encode(&random_bytes);
        let digest = self.digest(&token);

        IssuedToken { token, digest }
    }

    pub fn digest(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{}{}", DIGEST_PREFIX, URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Check a presented token against a stored digest
    pub fn verify(&self, token: &str, stored_digest: &str) -> bool {
        if token.is_empty() {
            return false;
        }

        constant_time_compare(&self.digest(token), stored_digest)
    }
}

impl Default for TokenDigester {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let digester = TokenDigester::new();
        let issued = digester.issue();

        assert!(issued.digest.starts_with("sha256$"));
        assert!(!issued.digest.contains(&issued.token));
        assert!(digester.verify(&issued.token, &issued.digest));
        assert!(!digester.verify("forged", &issued.digest));
    }

    #[test]
    fn test_tokens_are_unique() {
        let digester = TokenDigester::new();

        let first = digester.issue();
        let second = digester.issue();

        assert_ne!(first.token, second.token);
        assert_ne!(first.digest, second.digest);
    }

    #[test]
    fn test_token_length_follows_byte_count() {
        let digester = TokenDigester::new().with_token_bytes(16);
        let issued = digester.issue();

        // 16 bytes -> 22 base64 characters without padding
        assert_eq!(issued.token.len(), 22);
    }

    #[test]
    fn test_token_bytes_are_floored() {
        let digester = TokenDigester::new().with_token_bytes(0);
        let issued = digester.issue();

        assert_eq!(issued.token.len(), 22);
        assert!(!digester.verify("", &issued.digest));
    }

    #[test]
    fn test_empty_token_never_verifies() {
        let digester = TokenDigester::new();
        let empty_digest = digester.digest("");

        assert!(!digester.verify("", &empty_digest));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let digester = TokenDigester::new();
        assert_eq!(digester.digest("abc"), digester.digest("abc"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("", "a"));
    }
}
