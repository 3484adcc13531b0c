//! Argon2id password hashing adapter.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// [`PasswordHasher`] producing PHC-formatted Argon2id hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let mut salt_bytes = [0_u8; 16];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("same").expect("hash");
        let second = hasher.hash("same").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_reported() {
        let err = Argon2PasswordHasher
            .verify("secret", "plaintext-secret")
            .expect_err("not a PHC string");
        assert!(matches!(err, PasswordHashError::MalformedHash { .. }));
    }
}
