//! Credential hashing

use anyhow::Result;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use tracing::warn;

/// Hashing capability used by the user registry
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext secret into a storable digest
    fn hash(&self, secret: &str) -> Result<String>;

    /// Check a plaintext secret against a stored digest
    fn verify(&self, secret: &str, digest: &str) -> Result<bool>;
}

/// Argon2id hasher with a random salt per digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let digest = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(digest)
    }

    fn verify(&self, secret: &str, digest: &str) -> Result<bool> {
        // Legacy bcrypt digests cannot be checked here; treat them as a mismatch
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored digest is not a PHC string: {}", e);
                return Ok(false);
            }
        };

        let argon2 = Argon2::default();
        let result = argon2.verify_password(secret.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }
}

/// Reversible stand-in for tests, where argon2 would dominate run time
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHasher;

#[cfg(test)]
impl CredentialHasher for PlainHasher {
    fn hash(&self, secret: &str) -> Result<String> {
        Ok(format!("plain${}", secret))
    }

    fn verify(&self, secret: &str, digest: &str) -> Result<bool> {
        Ok(digest.strip_prefix("plain$") == Some(secret))
    }
}
