use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("failed to gather salt entropy: {0}")]
    Entropy(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Fixed salt for the stand-in hash. It never protects a real secret.
const DUMMY_SALT: &str = "c2Nob29sLWFwaS1kdW1teQ";

/// One-way salted password hashing (Argon2id, PHC string output).
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    /// Hash of no real account, built with the same cost as live hashes.
    dummy_hash: Arc<str>,
}

impl Passwords {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt =
            SaltString::from_b64(DUMMY_SALT).map_err(|e| PasswordError::Hash(e.to_string()))?;
        let dummy_hash = argon2
            .hash_password(b"no-such-account", &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?
            .to_string();
        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::new(
            security.argon2_m_cost,
            security.argon2_t_cost,
            security.argon2_p_cost,
        )
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Entropy(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hash(e.to_string()))?;
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(phc.to_string())
    }

    /// Parameters are read from the stored PHC string, so hashes produced
    /// under older cost settings keep verifying.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self.argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

impl Passwords {
    /// Runs a full comparison against the stand-in hash and always fails.
    /// Used when no account matches, so the lookup miss costs as much as a
    /// wrong password.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.dummy_hash);
        false
    }
}

impl std::fmt::Debug for Passwords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passwords").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn fast() -> Passwords {
    Passwords::new(8, 1, 1).expect("minimal argon2 params")
}
