#![forbid(unsafe_code)]

//! Password digests.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("salt encoding failed: {0}")]
    Salt(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub trait CredentialService: Send + Sync {
    /// Produces a self-describing digest suitable for storage.
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// `false` for a wrong password and for a digest that cannot be parsed.
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id with a fresh random salt per digest, stored as a PHC string.
#[derive(Clone, Debug, Default)]
pub struct Argon2Credentials {
    params: Params,
}

impl Argon2Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cost parameters for new digests. Existing digests carry their own.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialService for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Salt(e.to_string()))?;

        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
