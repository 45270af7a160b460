//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chronal_core::auth::{is_token_expired, AuthError as CoreError, TokenId};
use chronal_core::calendar::User;
use chrono::Utc;
use serde_json::json;

use crate::{AuthError, AuthState};

/// Reads the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<TokenId, CoreError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(CoreError::MissingToken)?
        .to_str()
        .map_err(|_| CoreError::InvalidToken)?;

    match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(CoreError::InvalidToken)
            } else {
                Ok(TokenId::new(token))
            }
        }
        _ => Err(CoreError::InvalidToken),
    }
}

/// Resolves a bearer token to its user. Expired tokens are deleted on sight.
async fn authenticate(state: &AuthState, token_id: &TokenId) -> Result<User, AuthError> {
    let token = state
        .tokens
        .get_token(token_id)
        .await?
        .ok_or(CoreError::InvalidToken)?;

    if is_token_expired(&token, Utc::now()) {
        tracing::debug!(user_id = %token.user_id, "Rejecting expired token");
        if let Err(e) = state.tokens.delete_token(token_id).await {
            tracing::warn!(error = %e, "Failed to delete expired token");
        }
        return Err(CoreError::TokenExpired.into());
    }

    let user = state
        .users
        .get_user(token.user_id)
        .await?
        .ok_or(CoreError::InvalidToken)?;

    Ok(user)
}

/// Extractor for authenticated user. Returns 401 if not authenticated.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let token_id = bearer_token(&parts.headers)?;
        let user = authenticate(&auth_state, &token_id).await?;
        Ok(CurrentUser(user))
    }
}

/// Extractor for optionally authenticated user. Returns None if not authenticated.
///
/// Bad or expired credentials mean anonymous; storage failures are still errors.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let Ok(token_id) = bearer_token(&parts.headers) else {
            return Ok(OptionalUser(None));
        };

        match authenticate(&auth_state, &token_id).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(e) if e.status_code().is_server_error() => Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "Treating request as anonymous");
                Ok(OptionalUser(None))
            }
        }
    }
}

/// Extractor for an authenticated superuser. Returns 401 if not authenticated
/// and 403 if the user is not a superuser.
pub struct Superuser(pub User);

impl<S> FromRequestParts<S> for Superuser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !user.is_superuser {
            tracing::warn!(user_id = %user.id, "Authorization denied: superuser required");
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "msg": "Superuser privileges required" })),
            )
                .into_response());
        }

        Ok(Superuser(user))
    }
}
