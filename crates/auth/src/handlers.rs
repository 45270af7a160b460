//! HTTP handlers for user account routes.

use axum::{
    extract::{FromRequest, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chronal_core::auth::{
    issue_token, validate_registration, AuthError as CoreError, RegisterRequest, TokenRequest,
    TokenResponse,
};
use chronal_core::calendar::User;
use chronal_core::storage::RepositoryError;
use chrono::Utc;
use serde::Serialize;

use crate::error::AuthError;
use crate::extractors::{bearer_token, CurrentUser};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::AuthState;

/// JSON body and response; malformed bodies render as `{"msg": "..."}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
struct Json<T>(T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Creates the router with all account routes.
///
/// Routes:
/// - `POST /users/register` - Create an account
/// - `POST /users/token` - Exchange email and password for a bearer token
/// - `POST /users/logout` - Revoke the presented token
/// - `POST /users/logout-all` - Revoke every token of the current user
/// - `GET /users/me` - Get current authenticated user
pub fn user_routes() -> Router<AuthState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/token", post(token))
        .route("/users/logout", post(logout))
        .route("/users/logout-all", post(logout_all))
        .route("/users/me", get(me))
}

async fn register(
    State(state): State<AuthState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let valid = validate_registration(
        &request,
        state.config.min_password_length,
        &state.config.blacklisted_names,
    )?;

    if state.users.get_user_by_email(&valid.email).await?.is_some() {
        return Err(CoreError::EmailInUse.into());
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let user = User::new(valid.email, valid.name, password_hash);

    // A concurrent registration may win between the lookup and the insert.
    match state.users.create_user(&user).await {
        Ok(()) => {}
        Err(RepositoryError::AlreadyExists { .. }) => return Err(CoreError::EmailInUse.into()),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn token(
    State(state): State<AuthState>,
    Json(request): Json<TokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = request.email.trim().to_lowercase();

    let user = state
        .users
        .get_user_by_email(&email)
        .await?
        .ok_or(CoreError::EmailNotFound)?;

    if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(CoreError::WrongPassword.into());
    }

    let token = issue_token(user.id, Utc::now(), state.config.token_ttl_chrono());
    state.tokens.create_token(&token).await?;

    tracing::info!(user_id = %user.id, expires_at = %token.expires_at, "Token issued");
    Ok((StatusCode::CREATED, Json(TokenResponse::from(&token))))
}

/// Revokes the presented token. Unknown or missing tokens are not an error.
async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    if let Ok(token_id) = bearer_token(&headers) {
        state.tokens.delete_token(&token_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn logout_all(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AuthError> {
    state.tokens.delete_user_tokens(user.id).await?;
    tracing::info!(user_id = %user.id, "All tokens revoked");
    Ok(StatusCode::NO_CONTENT)
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use chronal_core::auth::verify_password;

    use crate::test_support::{test_state, with_user, TEST_PASSWORD};
    use crate::Superuser;

    fn app(state: AuthState) -> Router {
        Router::new()
            .merge(user_routes())
            .route("/admin", get(|Superuser(user): Superuser| async move { user.email }))
            .with_state(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(state: &AuthState, email: &str) -> String {
        let response = app(state.clone())
            .oneshot(json_request(
                "POST",
                "/users/token",
                json!({ "email": email, "password": TEST_PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_creates_user() {
        let state = test_state();
        let response = app(state.clone())
            .oneshot(json_request(
                "POST",
                "/users/register",
                json!({ "email": "Grace@Example.com", "password": "longenough" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "grace@example.com");
        assert_eq!(body["name"], "grace");
        assert_eq!(body["is_superuser"], false);
        assert!(body.get("password_hash").is_none());

        let stored = state
            .users
            .get_user_by_email("grace@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("longenough", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let state = test_state();
        with_user(&state, "heidi@example.com", false).await;

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/users/register",
                json!({ "email": "HEIDI@example.com", "password": "longenough" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["msg"], "Email already in use");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let state = test_state();
        for body in [
            json!({ "email": "not-an-email", "password": "longenough" }),
            json!({ "email": "ivan@example.com", "password": "short" }),
            json!({ "email": "ivan@example.com", "password": "longenough", "name": "Admin Ivan" }),
        ] {
            let response = app(state.clone())
                .oneshot(json_request("POST", "/users/register", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn test_malformed_bodies_render_json_errors() {
        let response = app(test_state())
            .oneshot(json_request("POST", "/users/register", json!({ "nope": 1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["msg"].is_string());

        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/token")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"email\":"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["msg"].is_string());

        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/token")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["msg"].is_string());
    }

    #[tokio::test]
    async fn test_token_issues_bearer_token() {
        let state = test_state();
        with_user(&state, "judy@example.com", false).await;

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/users/token",
                json!({ "email": "judy@example.com", "password": TEST_PASSWORD }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["access_token"].as_str().unwrap().len(), 43);
    }

    #[tokio::test]
    async fn test_token_unknown_email_is_404() {
        let response = app(test_state())
            .oneshot(json_request(
                "POST",
                "/users/token",
                json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_wrong_password_is_400() {
        let state = test_state();
        with_user(&state, "judy@example.com", false).await;

        let response = app(state)
            .oneshot(json_request(
                "POST",
                "/users/token",
                json!({ "email": "judy@example.com", "password": "wrong-password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["msg"], "Wrong password");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .uri("/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_current_user() {
        let state = test_state();
        let user = with_user(&state, "mallory@example.com", false).await;
        let token = login(&state, "mallory@example.com").await;

        let response = app(state)
            .oneshot(authed("GET", "/users/me", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], user.id.to_string());
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let state = test_state();
        with_user(&state, "niaj@example.com", false).await;
        let token = login(&state, "niaj@example.com").await;

        let response = app(state.clone())
            .oneshot(authed("POST", "/users/logout", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app(state)
            .oneshot(authed("GET", "/users/me", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_without_token_is_noop() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_logout_all_revokes_every_token() {
        let state = test_state();
        with_user(&state, "olivia@example.com", false).await;
        let first = login(&state, "olivia@example.com").await;
        let second = login(&state, "olivia@example.com").await;

        let response = app(state.clone())
            .oneshot(authed("POST", "/users/logout-all", &first))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app(state)
            .oneshot(authed("GET", "/users/me", &second))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_superuser_extractor() {
        let state = test_state();
        with_user(&state, "root@example.com", true).await;
        with_user(&state, "peggy@example.com", false).await;
        let root = login(&state, "root@example.com").await;
        let peggy = login(&state, "peggy@example.com").await;

        let response = app(state.clone())
            .oneshot(authed("GET", "/admin", &root))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state)
            .oneshot(authed("GET", "/admin", &peggy))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["msg"],
            "Superuser privileges required"
        );
    }
}
