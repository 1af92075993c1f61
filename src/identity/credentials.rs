//! Salted credential storage and verification, one secret per owner id.
//! Stored hashes are argon2 PHC strings; nothing in this module ever hands one
//! back to a caller, and there is no plaintext or zero-cost fallback.

use std::collections::HashMap;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

/// Internal to the identity layer. The login path collapses every variant to
/// the same invalid-credentials problem; only id-keyed internal callers may see
/// which one occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("no credential stored for owner {0}")]
    NotFound(String),
    #[error("hash comparison failed")]
    HashComparisonFailed,
    #[error("hashing failed: {0}")]
    Hashing(String),
}

pub struct CredentialStore {
    argon2: Argon2<'static>,
    hashes: RwLock<HashMap<String, String>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Production work factor (argon2id defaults).
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Tunable work factor. Every secret still goes through argon2 regardless
    /// of the params chosen.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            hashes: RwLock::new(HashMap::new()),
        }
    }

    /// Minimum cost argon2 accepts. Test profile; production uses `new()`.
    pub fn min_cost_params() -> Params {
        // Constants straight from the argon2 crate, valid by construction.
        Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .expect("minimum argon2 params")
    }

    /// Hash `plaintext` with a fresh random salt and store it for `owner`,
    /// overwriting any prior hash. The prior hash, if any, is gone for good.
    /// Hashing runs before the lock is taken; the lock covers only the insert.
    pub fn set(&self, owner: &str, plaintext: &str) -> Result<(), CredentialError> {
        let phc = self.hash(plaintext)?;
        self.hashes.write().insert(owner.to_string(), phc);
        Ok(())
    }

    /// Check `plaintext` against the stored hash for `owner`. A mismatch is
    /// `Ok(false)`, not an error; `NotFound` and `HashComparisonFailed` stay
    /// distinct so the caller that is allowed to know can tell them apart.
    pub fn verify(&self, owner: &str, plaintext: &str) -> Result<bool, CredentialError> {
        // Clone the PHC out so the argon2 work runs with no lock held.
        let phc = self
            .hashes
            .read()
            .get(owner)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound(owner.to_string()))?;
        let parsed =
            PasswordHash::new(&phc).map_err(|_| CredentialError::HashComparisonFailed)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(CredentialError::HashComparisonFailed),
        }
    }

    /// Drop the hash for `owner`. Cascade hook for identity deletion; removing
    /// an absent credential is not an error.
    pub fn remove(&self, owner: &str) {
        self.hashes.write().remove(owner);
    }

    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();
        Ok(phc)
    }
}
