//! Secret comparison seam: plaintext vs stored hash.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{Error as HashError, PasswordHash},
    Argon2, PasswordVerifier,
};
use async_trait::async_trait;

/// Compares a supplied plaintext secret against a stored hash.
///
/// A mismatch is `Ok(false)`; a malformed or missing stored hash is an
/// error, which the token-guarded gates fold into their uniform rejection.
#[async_trait]
pub trait SecretVerifier: Send + Sync {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool>;
}

/// `SecretVerifier` over Argon2 PHC-format hashes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Verifier;

#[async_trait]
impl SecretVerifier for Argon2Verifier {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|err| anyhow!("malformed hash: {err}"))?;
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(err) => Err(anyhow!("hash comparison failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        PasswordHasher,
    };

    fn hash(plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| anyhow!("hashing failed: {err}"))?;
        Ok(hashed.to_string())
    }

    #[tokio::test]
    async fn verify_matches_own_hash() -> Result<()> {
        let hashed = hash("Str0ngPass")?;
        let verifier = Argon2Verifier;
        assert!(verifier.verify("Str0ngPass", &hashed).await?);
        assert!(!verifier.verify("WrongPass1", &hashed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error_not_a_panic() {
        let verifier = Argon2Verifier;
        assert!(verifier.verify("Str0ngPass", "not-a-phc-hash").await.is_err());
        assert!(verifier.verify("Str0ngPass", "").await.is_err());
    }
}
