use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::{password_hash::SaltString, Argon2};
use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use uuid::Uuid;

use super::{AccessToken, AuthError, TokenId};

/// Length of generated bearer tokens.
pub const TOKEN_LENGTH: usize = 43;

/// Generate a cryptographically random bearer token value.
pub fn generate_token_id() -> TokenId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    TokenId::new(id)
}

/// Issue a new token for `user_id`, valid for `ttl` from `now`.
pub fn issue_token(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> AccessToken {
    AccessToken {
        token: generate_token_id(),
        user_id,
        created_at: now,
        expires_at: calculate_expiry(now, ttl),
    }
}

/// Check if a token has expired.
pub fn is_token_expired(token: &AccessToken, now: DateTime<Utc>) -> bool {
    token.expires_at <= now
}

/// Calculate token expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Extract username from email if no name provided.
pub fn email_to_name(email: &str) -> String {
    match email.split('@').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "User".to_string(),
    }
}

/// Hash a password with Argon2id and a random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash is unreadable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
