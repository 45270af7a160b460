use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AccessToken, AuthError, TokenId};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Bearer token storage abstraction.
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Store a newly issued token.
    async fn create_token(&self, token: &AccessToken) -> Result<()>;

    /// Retrieve a token by its value.
    async fn get_token(&self, id: &TokenId) -> Result<Option<AccessToken>>;

    /// Delete a specific token (logout).
    async fn delete_token(&self, id: &TokenId) -> Result<()>;

    /// Delete all tokens for a user (logout-all).
    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()>;

    /// Delete every token that expired at or before `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
