//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use chronal_core::auth::AccessTokenRepository;
use chronal_core::storage::UserRepository;

use crate::config::AuthConfig;

/// Shared state for auth handlers and extractors.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn AccessTokenRepository>,
    pub users: Arc<dyn UserRepository>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(
        tokens: Arc<dyn AccessTokenRepository>,
        users: Arc<dyn UserRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            tokens,
            users,
            config,
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
