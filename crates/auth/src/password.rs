//! Password hashing (Argon2id).
//!
//! Plaintext passwords exist only transiently: the directory engine hashes on
//! create/update and the issuer verifies on login. Nothing else sees them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};

use userhub_core::ServiceError;

/// Hash a plaintext password with a random salt.
pub fn hash(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Storage(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
///
/// An unparseable stored hash verifies as false rather than erroring; the
/// caller cannot do anything more useful with a corrupt hash than reject.
pub fn verify(plain: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
