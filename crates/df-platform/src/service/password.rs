//! Password Service
//!
//! Argon2id hashing and verification. Hashes are stored as PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{PlatformError, Result};

#[derive(Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PlatformError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a candidate password against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`; only malformed hashes or backend
    /// failures are errors.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::internal(format!("Malformed password hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(PlatformError::internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let svc = PasswordService::default();
        let hash = svc.hash_password("s3cret").unwrap();
        assert!(svc.verify_password("s3cret", &hash).unwrap());
        assert!(!svc.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let svc = PasswordService::default();
        let a = svc.hash_password("s3cret").unwrap();
        let b = svc.hash_password("s3cret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let svc = PasswordService::default();
        assert!(svc.verify_password("s3cret", "not-a-phc-string").is_err());
    }
}
