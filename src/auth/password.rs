use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

/// Hash a plaintext password using Argon2.
///
/// Argon2 is deliberately slow, so the work runs on the blocking pool
/// rather than on the async runtime.
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_sync(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))?
}

/// Verify a plaintext password against a stored hash, on the blocking pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password_sync(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))?
}

pub(crate) fn hash_password_sync(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

pub(crate) fn verify_password_sync(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Password policy: at least 8 characters with one uppercase letter, one
/// lowercase letter, one digit and one symbol.
pub fn password_meets_policy(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

/// Username policy: at least 3 characters, letters and digits only.
pub fn username_is_valid(username: &str) -> bool {
    username.chars().count() >= 3 && username.chars().all(|c| c.is_ascii_alphanumeric())
}
