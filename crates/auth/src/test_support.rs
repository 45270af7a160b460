//! Shared fixtures for this crate's tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chronal_core::auth::hash_password;
use chronal_core::calendar::User;
use chronal_core::storage::{RepositoryError, Result, UserRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AuthConfig, AuthState, InMemoryTokenStore};

pub const TEST_PASSWORD: &str = "hunter2hunter2";

/// Minimal user store; the server crate owns the real backends.
#[derive(Default)]
pub struct MemoryUsers {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("User", &user.email));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}

pub fn test_state() -> AuthState {
    AuthState::new(
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(MemoryUsers::default()),
        AuthConfig::default(),
    )
}

/// Inserts a user whose password is [`TEST_PASSWORD`].
pub async fn with_user(state: &AuthState, email: &str, is_superuser: bool) -> User {
    let hash = hash_password(TEST_PASSWORD).unwrap();
    let user = User::new(email, "test", hash).with_superuser(is_superuser);
    state.users.create_user(&user).await.unwrap();
    user
}
