use axum::{
    extract::rejection::JsonRejection,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chronal_core::http_mapping::{auth_error_to_status_code, repository_error_to_status_code};
use chronal_core::storage::RepositoryError;
use serde_json::json;
use thiserror::Error;

/// Auth errors for the chronal_auth crate.
///
/// This wraps the core `AuthError` and adds repository failures that
/// surface while looking up users.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (validation, token checks, storage).
    #[error(transparent)]
    Core(#[from] chronal_core::auth::AuthError),

    /// User repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Request body was not the expected JSON.
    #[error(transparent)]
    Json(#[from] JsonRejection),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            AuthError::Core(err) => auth_error_to_status_code(err),
            AuthError::Repository(err) => repository_error_to_status_code(err),
            AuthError::Json(rejection) => rejection.status().as_u16(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Auth error");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "Auth request rejected");
            self.to_string()
        };

        let mut response = (status, Json(json!({ "msg": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronal_core::auth::AuthError as CoreError;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge_header() {
        let response = AuthError::from(CoreError::TokenExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
        assert_eq!(body_json(response).await["msg"], "Token expired");
    }

    #[tokio::test]
    async fn test_conflict_keeps_message() {
        let response = AuthError::from(CoreError::EmailInUse).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["msg"], "Email already in use");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            AuthError::from(RepositoryError::QueryFailed("disk I/O error".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["msg"], "Internal server error");
    }
}
