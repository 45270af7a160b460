//! Argon2 hashing off the async workers.

use chronal_core::auth::{hash_password, verify_password, AuthError as CoreError};
use tokio::task;

/// Hash a password on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, CoreError> {
    task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?
}

/// Verify a password against a stored PHC hash on the blocking pool.
pub async fn verify_password_blocking(
    password: String,
    password_hash: String,
) -> Result<bool, CoreError> {
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?
}
