//! In-memory token storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use chronal_core::auth::{is_token_expired, AccessToken, AccessTokenRepository, Result, TokenId};

/// In-memory token store for development and testing.
///
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl InMemoryTokenStore {
    /// Creates a new empty in-memory token store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryTokenStore {
    async fn create_token(&self, token: &AccessToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.token.as_str().to_string(), token.clone());
        Ok(())
    }

    async fn get_token(&self, id: &TokenId) -> Result<Option<AccessToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(id.as_str()).cloned())
    }

    async fn delete_token(&self, id: &TokenId) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.remove(id.as_str());
        Ok(())
    }

    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !is_token_expired(t, now));
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronal_core::auth::issue_token;
    use chrono::Duration;

    fn token_for(user_id: Uuid, ttl_hours: i64) -> AccessToken {
        issue_token(user_id, Utc::now(), Duration::hours(ttl_hours))
    }

    #[tokio::test]
    async fn test_token_create_and_get() {
        let store = InMemoryTokenStore::new();
        let token = token_for(Uuid::new_v4(), 1);

        store.create_token(&token).await.unwrap();

        let retrieved = store.get_token(&token.token).await.unwrap();
        assert_eq!(retrieved, Some(token));
    }

    #[tokio::test]
    async fn test_get_nonexistent_token() {
        let store = InMemoryTokenStore::new();
        let retrieved = store.get_token(&TokenId::new("missing")).await.unwrap();
        assert!(retrieved.is_none());
    }

    #[tokio::test]
    async fn test_delete_token() {
        let store = InMemoryTokenStore::new();
        let token = token_for(Uuid::new_v4(), 1);
        store.create_token(&token).await.unwrap();

        store.delete_token(&token.token).await.unwrap();

        assert!(store.get_token(&token.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_tokens_keeps_other_users() {
        let store = InMemoryTokenStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let a1 = token_for(alice, 1);
        let a2 = token_for(alice, 1);
        let b1 = token_for(bob, 1);
        for t in [&a1, &a2, &b1] {
            store.create_token(t).await.unwrap();
        }

        store.delete_user_tokens(alice).await.unwrap();

        assert!(store.get_token(&a1.token).await.unwrap().is_none());
        assert!(store.get_token(&a2.token).await.unwrap().is_none());
        assert!(store.get_token(&b1.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryTokenStore::new();
        let user = Uuid::new_v4();
        let live = token_for(user, 1);
        let dead = issue_token(user, Utc::now() - Duration::hours(3), Duration::hours(1));
        store.create_token(&live).await.unwrap();
        store.create_token(&dead).await.unwrap();

        let purged = store.purge_expired(Utc::now()).await.unwrap();

        assert_eq!(purged, 1);
        assert!(store.get_token(&live.token).await.unwrap().is_some());
        assert!(store.get_token(&dead.token).await.unwrap().is_none());
    }
}
