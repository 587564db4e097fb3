//! # Credentials
//!
//! Users are stored with a one-way hash of their password, never the
//! plaintext. Hashing sits behind [`CredentialHasher`] so callers (and tests)
//! can swap the algorithm; [`Argon2Hasher`] is the production choice.

use crate::error::{ChirpyError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub trait CredentialHasher: Send + Sync {
    /// Produce a storable hash of `plaintext`.
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Check `plaintext` against a hash produced by [`hash`](Self::hash).
    /// A malformed hash never verifies.
    fn verify(&self, hashed: &str, plaintext: &str) -> bool;
}

/// Argon2id with a fresh random salt per hash, encoded as a PHC string.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ChirpyError::Credential(e.to_string()))
    }

    fn verify(&self, hashed: &str, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
