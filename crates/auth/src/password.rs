//! Password hashing and verification (Argon2id, PHC string format).

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("salt generation failed: {0}")]
    Salt(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hashes raw passwords for storage and checks raw passwords against stored hashes.
pub trait PasswordEncoder: Send + Sync {
    /// Hash a raw password with a fresh random salt.
    fn encode(&self, raw: &str) -> Result<String, PasswordError>;

    /// Re-hash `raw` with the salt and parameters embedded in `hash` and compare
    /// in constant time. Unparseable hashes never match.
    fn matches(&self, raw: &str, hash: &str) -> bool;

    /// Spend the same work as [`PasswordEncoder::matches`] when there is no stored
    /// hash to check, so a missing user costs as much as a wrong password.
    fn mitigate_timing(&self, raw: &str);
}

/// Argon2id encoder with the crate's default parameters.
///
/// Construction hashes a throwaway password once, so the first unknown-user
/// login costs the same as every later one.
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
    dummy_hash: Option<String>,
}

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        let argon2 = Argon2::default();
        let dummy_hash = match hash_password(&argon2, "warden-timing-mitigation") {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "timing mitigation hash unavailable");
                None
            }
        };
        Self { argon2, dummy_hash }
    }
}

impl Default for Argon2PasswordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_password(argon2: &Argon2<'_>, raw: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = argon2
        .hash_password(raw.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(phc.to_string())
}

impl core::fmt::Debug for Argon2PasswordEncoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2PasswordEncoder").finish_non_exhaustive()
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String, PasswordError> {
        hash_password(&self.argon2, raw)
    }

    fn matches(&self, raw: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                false
            }
        }
    }

    fn mitigate_timing(&self, raw: &str) {
        if let Some(hash) = self.dummy_hash.as_deref() {
            let _ = self.matches(raw, hash);
        }
    }
}
