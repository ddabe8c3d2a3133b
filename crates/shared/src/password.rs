//! Password digests using Argon2id.
//!
//! Users and devices authenticate with a secret that is never stored in
//! plain form. Only the PHC-formatted Argon2id digest is kept, and only in
//! the store's internal documents: [`PasswordDigest`] deliberately does not
//! implement `Serialize`, so it cannot leak into an outward representation.

use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters following OWASP recommendations (2024).
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id and returns the PHC string.
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// # Returns
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError)` - The stored hash is unusable
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // The PHC string carries its own parameters.
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// One-way digest of a user or device secret.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hashes `plaintext` with a fresh salt.
    ///
    /// A failure here means the hasher itself is broken; callers must abort
    /// the operation instead of storing anything.
    pub fn hash(plaintext: &str) -> Result<Self, PasswordError> {
        hash_password(plaintext).map(Self)
    }

    /// Wraps a digest read back from the store.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Returns `true` if `plaintext` matches this digest.
    ///
    /// A corrupted stored digest never matches.
    pub fn verify(&self, plaintext: &str) -> bool {
        match verify_password(plaintext, &self.0) {
            Ok(matches) => matches,
            Err(_) => false,
        }
    }

    /// The PHC string, for the store's internal representation only.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_returns_phc_format() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_password_produces_unique_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_digest_verify() {
        let digest = PasswordDigest::hash("secret1").unwrap();
        assert!(digest.verify("secret1"));
        assert!(!digest.verify("wrong"));
    }

    #[test]
    fn test_digest_verify_generated_passwords() {
        use fake::{faker::internet::en::Password, Fake};

        for _ in 0..3 {
            let plaintext: String = Password(8..24).fake();
            let digest = PasswordDigest::hash(&plaintext).unwrap();
            assert!(digest.verify(&plaintext));
            assert!(!digest.verify(&format!("{plaintext}x")));
        }
    }

    #[test]
    fn test_digest_unicode() {
        let digest = PasswordDigest::hash("密码123!пароль").unwrap();
        assert!(digest.verify("密码123!пароль"));
        assert!(!digest.verify("different"));
    }

    #[test]
    fn test_digest_from_stored_roundtrip() {
        let digest = PasswordDigest::hash("test").unwrap();
        let restored = PasswordDigest::from_stored(digest.as_str().to_string());
        assert_eq!(restored, digest);
        assert!(restored.verify("test"));
    }

    #[test]
    fn test_corrupted_digest_never_verifies() {
        let digest = PasswordDigest::from_stored("garbage");
        assert!(!digest.verify("garbage"));
        assert!(!digest.verify(""));
    }

    #[test]
    fn test_digest_debug_is_redacted() {
        let digest = PasswordDigest::hash("test").unwrap();
        let printed = format!("{:?}", digest);
        assert!(!printed.contains("argon2"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_password_error_display() {
        let err = PasswordError::HashError("test error".to_string());
        assert!(format!("{}", err).contains("test error"));

        let err = PasswordError::InvalidHashFormat;
        assert!(format!("{}", err).contains("Invalid password hash format"));
    }
}
