use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;

/// Password hashing provider
///
/// Hashes credential fields with Argon2id, using the configured pepper as the
/// Argon2 secret parameter.
pub struct CryptoProvider {
    password_pepper: String,
}

impl CryptoProvider {
    /// Create a new CryptoProvider
    ///
    /// # Arguments
    /// * `password_pepper` - The secret mixed into every password hash
    pub fn new(password_pepper: impl Into<String>) -> Self {
        Self {
            password_pepper: password_pepper.into(),
        }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a plaintext password into a PHC string
    ///
    /// # Returns
    /// * `Ok(String)` - PHC formatted Argon2id hash
    /// * `Err(InternalError)` - Hasher could not be initialized or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::PasswordHashingFailed(e.to_string()))?
            .to_string();

        Ok(hash)
    }

    /// Check a plaintext password against a stored PHC hash
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, InternalError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| InternalError::parse("password_hash", e.to_string()))?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_crypto_provider() -> CryptoProvider {
        CryptoProvider::new("test-pepper-for-unit-tests")
    }

    #[test]
    fn test_hash_password_produces_argon2id_phc_string() {
        let crypto = create_test_crypto_provider();

        let hash = crypto.hash_password("s3cret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("s3cret"));
    }

    #[test]
    fn test_verify_password_round_trip() {
        let crypto = create_test_crypto_provider();
        let hash = crypto.hash_password("s3cret").unwrap();

        assert!(crypto.verify_password("s3cret", &hash).unwrap());
        assert!(!crypto.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_pepper_is_part_of_the_hash() {
        let crypto = create_test_crypto_provider();
        let other = CryptoProvider::new("another-pepper");
        let hash = crypto.hash_password("s3cret").unwrap();

        assert!(!other.verify_password("s3cret", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let crypto = create_test_crypto_provider();

        let first = crypto.hash_password("s3cret").unwrap();
        let second = crypto.hash_password("s3cret").unwrap();

        assert_ne!(first, second);
    }
}
