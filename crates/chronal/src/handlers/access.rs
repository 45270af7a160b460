use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use chronal_auth::{CurrentUser, Superuser};
use chronal_core::access::{
    authorize_grant, authorize_revoke, authorize_role_change, authorize_view_grant, AccessError,
    CalendarAction, Principal,
};
use chronal_core::calendar::{CalendarAccess, GrantAccessRequest, UpdateAccessRequest};
use chronal_core::storage::RepositoryError;

use super::authz::{load_calendar, load_grant};
use super::extract::{Json, Path};
use super::AppError;
use crate::state::AppState;

/// List the grants on a calendar (GET /calendars/{id}/access).
pub async fn list_calendar_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(calendar_id): Path<Uuid>,
) -> Result<Json<Vec<CalendarAccess>>, AppError> {
    let ctx = load_calendar(&state, calendar_id, &user).await?;
    ctx.authorize(CalendarAction::ListAccess)?;

    Ok(Json(state.access.list_access_for_calendar(calendar_id).await?))
}

/// Grant a role on a calendar to another user (POST /calendars/{id}/access).
pub async fn grant_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(calendar_id): Path<Uuid>,
    Json(payload): Json<GrantAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = load_calendar(&state, calendar_id, &user).await?;
    // Refuse before revealing whether the target user exists.
    ctx.authorize(CalendarAction::Grant)?;

    if state.users.get_user(payload.user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }

    let existing = state
        .access
        .get_access_for_user(calendar_id, payload.user_id)
        .await?;
    authorize_grant(
        &ctx.principal,
        ctx.role,
        calendar_id,
        payload.role,
        existing.as_ref(),
    )?;

    let target_user = payload.user_id;
    let grant = payload.into_access(calendar_id, user.id);
    match state.access.create_access(&grant).await {
        Ok(()) => {}
        // Lost a race against a concurrent grant for the same user.
        Err(RepositoryError::AlreadyExists { .. }) => {
            return Err(AccessError::AlreadyGranted {
                calendar_id,
                user_id: target_user,
            }
            .into())
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        calendar_id = %calendar_id,
        access_id = %grant.id,
        grantee = %grant.user_id,
        role = %grant.role,
        granted_by = %user.id,
        "Granted calendar access"
    );

    Ok((StatusCode::CREATED, Json(grant)))
}

/// Change the role of a grant (PATCH /calendars/{id}/access/{access_id}).
pub async fn update_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((calendar_id, access_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAccessRequest>,
) -> Result<Json<CalendarAccess>, AppError> {
    let ctx = load_calendar(&state, calendar_id, &user).await?;
    let mut grant = load_grant(&state, calendar_id, access_id).await?;

    authorize_role_change(&ctx.principal, ctx.role, &grant, payload.role)?;

    let previous = grant.role;
    payload.apply_to(&mut grant);
    state.access.update_access(&grant).await?;

    tracing::info!(
        calendar_id = %calendar_id,
        access_id = %access_id,
        from = %previous,
        to = %grant.role,
        user_id = %user.id,
        "Changed calendar role"
    );

    Ok(Json(grant))
}

/// Revoke a grant (DELETE /calendars/{id}/access/{access_id}).
///
/// Holders may always drop their own grant, except the owner.
pub async fn revoke_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((calendar_id, access_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let ctx = load_calendar(&state, calendar_id, &user).await?;
    let grant = load_grant(&state, calendar_id, access_id).await?;

    authorize_revoke(&ctx.principal, ctx.role, &grant)?;

    state.access.delete_access(access_id).await?;

    tracing::info!(
        calendar_id = %calendar_id,
        access_id = %access_id,
        grantee = %grant.user_id,
        user_id = %user.id,
        "Revoked calendar access"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// List every grant (GET /calendars-access). Superusers only.
pub async fn list_all_access(
    State(state): State<AppState>,
    Superuser(_): Superuser,
) -> Result<Json<Vec<CalendarAccess>>, AppError> {
    Ok(Json(state.access.list_access().await?))
}

/// The caller's own grants (GET /calendars-access/me).
pub async fn my_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CalendarAccess>>, AppError> {
    Ok(Json(state.access.list_access_for_user(user.id).await?))
}

/// A user's grants (GET /calendars-access/user/{user_id}). Superusers only.
pub async fn user_access(
    State(state): State<AppState>,
    Superuser(_): Superuser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CalendarAccess>>, AppError> {
    if state.users.get_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }

    Ok(Json(state.access.list_access_for_user(user_id).await?))
}

/// A single grant (GET /calendars-access/{access_id}).
///
/// Visible to its holder and to whoever issued it.
pub async fn get_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(access_id): Path<Uuid>,
) -> Result<Json<CalendarAccess>, AppError> {
    let grant = state
        .access
        .get_access(access_id)
        .await?
        .ok_or(AppError::NotFound("Access"))?;

    authorize_view_grant(&Principal::from(&user), &grant)?;

    Ok(Json(grant))
}
