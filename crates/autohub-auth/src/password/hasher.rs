//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use autohub_core::error::AppError;

/// Well-formed Argon2id hash that no password matches; verified against when
/// the identifier is unknown so both failure paths cost the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$IkVOOymmkhMNgI2v+ypGMg$LcQxAq3p3uNrb1gBXm+EI++nF+Gt8IBzB7JAc22gtu8";

/// Checks a presented password against a stored hash.
///
/// Implementations are CPU-bound and synchronous; async callers run them on
/// the blocking pool.
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AppError>;

    /// Performs the work of a verification for an identifier with no stored
    /// hash. Always `Ok(false)`.
    fn verify_absent(&self, _password: &str) -> Result<bool, AppError> {
        Ok(false)
    }
}

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl CredentialVerifier for PasswordHasher {
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AppError> {
        self.verify_password(password, stored_hash)
    }

    fn verify_absent(&self, password: &str) -> Result<bool, AppError> {
        self.verify_password(password, DUMMY_HASH).map(|_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohub_core::error::ErrorKind;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new();
        assert_ne!(
            hasher.hash_password("same").unwrap(),
            hasher.hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_verify_absent_runs_argon2_and_fails() {
        let hasher = PasswordHasher::new();
        assert!(PasswordHash::new(DUMMY_HASH).is_ok());
        assert!(!hasher.verify_absent("correct horse").unwrap());
        assert!(!hasher.verify_absent("").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let err = PasswordHasher::new().verify("pw", "not-a-phc-string").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
