//! Password hashing and verification.
//!
//! Hashes are Argon2id PHC strings with a fresh random salt per call, so the
//! same password never produces the same hash twice. Verification parses the
//! stored PHC string and lets `argon2` do the constant-time comparison.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a plaintext password into a PHC string.
///
/// # Errors
/// Returns `InvalidInput` for an empty password, `Hash` if the primitive fails.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::InvalidInput("password must not be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored PHC hash.
///
/// # Errors
/// Returns `InvalidInput` for an empty password or an unparseable hash.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::InvalidInput("password must not be empty"));
    }

    let parsed = PasswordHash::new(hash)
        .map_err(|_| CredentialError::InvalidInput("stored hash is not a PHC string"))?;

    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

/// Run [`hash_password`] on the blocking pool.
///
/// # Errors
/// Same as [`hash_password`], plus `Task` if the blocking task panics.
pub async fn hash_password_blocking(plaintext: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext)).await?
}

/// Run [`verify_password`] on the blocking pool.
///
/// # Errors
/// Same as [`verify_password`], plus `Task` if the blocking task panics.
pub async fn verify_password_blocking(
    plaintext: String,
    hash: String,
) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash)).await?
}
