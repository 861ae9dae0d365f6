//! Password digests (`DigestKind::Password`)
//!
//! Digests are Argon2id PHC strings. Each one carries its own salt and cost
//! parameters, so the hasher's parameters can be raised without invalidating
//! digests already stored on users.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Produces and checks the password digest stored on a `User`
pub trait PasswordHasher: Send + Sync + Debug {
    /// Digest a plaintext password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Check a plaintext password against a stored digest.
    ///
    /// A digest that does not parse is a mismatch, not an error.
    fn verify(&self, password: &str, digest: &str) -> bool;

    /// Do the work of one `verify` when there is no stored digest to check,
    /// so a missing account costs the same as a wrong password
    fn verify_absent(&self, password: &str);
}

/// Argon2id hasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    /// Digest of a fixed string, verified against when no user matches
    decoy: OnceCell<Option<String>>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Hash new passwords with custom cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            decoy: OnceCell::new(),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        // Cost parameters come from the digest itself
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    fn verify_absent(&self, password: &str) {
        let decoy = self.decoy.get_or_init(|| self.hash("decoy-password").ok());

        if let Some(digest) = decoy {
            self.verify(password, digest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn test_digest_is_argon2id_phc_string() {
        let hasher = Argon2Hasher::new();

        let digest = hasher.hash("secret1").unwrap();

        assert!(digest.starts_with("$argon2id$v=19$"));
        assert!(!digest.contains("secret1"));
        assert!(hasher.verify("secret1", &digest));
        assert!(!hasher.verify("secret2", &digest));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();

        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first));
        assert!(hasher.verify("secret1", &second));
    }

    #[test]
    fn test_digest_outlives_parameter_change() {
        let stored = cheap_hasher().hash("secret1").unwrap();
        assert!(stored.contains("m=1024,t=1,p=1"));

        let upgraded = Argon2Hasher::new();
        assert!(upgraded.verify("secret1", &stored));
        assert!(!upgraded.verify("secret2", &stored));
    }

    #[test]
    fn test_unparseable_digest_is_a_mismatch() {
        let hasher = cheap_hasher();

        assert!(!hasher.verify("secret1", "sha256$not-a-password-digest"));
        assert!(!hasher.verify("secret1", ""));
    }

    #[test]
    fn test_verify_absent_prepares_decoy_once() {
        let hasher = cheap_hasher();

        hasher.verify_absent("secret1");
        let decoy = hasher.decoy.get().cloned().flatten().unwrap();

        hasher.verify_absent("secret2");
        assert_eq!(hasher.decoy.get().cloned().flatten().unwrap(), decoy);
        assert!(hasher.verify("decoy-password", &decoy));
    }
}
