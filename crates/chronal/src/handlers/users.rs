use axum::extract::State;
use uuid::Uuid;

use chronal_auth::{CurrentUser, Superuser};
use chronal_core::access::{require_superuser, Principal};
use chronal_core::calendar::User;

use super::extract::{Json, Path};
use super::AppError;
use crate::state::AppState;

/// List every user (GET /users). Superusers only.
pub async fn list_users(
    State(state): State<AppState>,
    Superuser(_): Superuser,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_users().await?))
}

/// Get a user (GET /users/{id}). Superusers, or the user themself.
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    if caller.id == id {
        return Ok(Json(caller));
    }
    require_superuser(&Principal::from(&caller))?;

    state
        .users
        .get_user(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User"))
}
