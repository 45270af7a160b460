use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use chronal_auth::{CurrentUser, Superuser};
use chronal_core::access::CalendarAction;
use chronal_core::calendar::{
    check_calendar, Calendar, CalendarAccess, CalendarError, CalendarWithRole,
    CreateCalendarRequest, UpdateCalendarRequest,
};
use chronal_core::storage::RepositoryError;

use super::authz::load_calendar;
use super::extract::{Json, Path};
use super::AppError;
use crate::state::AppState;

/// List every calendar (GET /calendars). Superusers only.
pub async fn list_calendars(
    State(state): State<AppState>,
    Superuser(_): Superuser,
) -> Result<Json<Vec<Calendar>>, AppError> {
    Ok(Json(state.calendars.list_calendars().await?))
}

/// Calendars the caller holds any grant on, with their role (GET /calendars/me).
pub async fn my_calendars(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CalendarWithRole>>, AppError> {
    let calendars = state
        .access
        .get_calendars_for_user(user.id)
        .await?
        .into_iter()
        .map(CalendarWithRole::from)
        .collect();

    Ok(Json(calendars))
}

/// A store-level uniqueness violation means a concurrent request took the title.
fn title_conflict(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::AlreadyExists { .. } => CalendarError::DuplicateTitle.into(),
        other => other.into(),
    }
}

/// Create a calendar owned by the caller (POST /calendars).
pub async fn create_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateCalendarRequest>,
) -> Result<impl IntoResponse, AppError> {
    let calendar = payload.into_calendar(user.id);

    let owned = state.calendars.get_calendars_by_owner(user.id).await?;
    check_calendar(&calendar, &owned)?;

    let owner = CalendarAccess::owner(&calendar);
    state
        .calendars
        .create_calendar(&calendar, &owner)
        .await
        .map_err(title_conflict)?;

    tracing::info!(calendar_id = %calendar.id, owner_id = %user.id, "Created calendar");

    Ok((StatusCode::CREATED, Json(calendar)))
}

/// Get a single calendar (GET /calendars/{id}).
pub async fn get_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Calendar>, AppError> {
    let ctx = load_calendar(&state, id, &user).await?;
    ctx.authorize(CalendarAction::View)?;

    Ok(Json(ctx.calendar))
}

/// Patch a calendar's title or description (PATCH /calendars/{id}).
pub async fn update_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCalendarRequest>,
) -> Result<Json<Calendar>, AppError> {
    let ctx = load_calendar(&state, id, &user).await?;
    ctx.authorize(CalendarAction::Update)?;

    let mut calendar = ctx.calendar;
    payload.apply_to(&mut calendar);

    // Titles are unique per owner, whoever performs the edit.
    let owned = state
        .calendars
        .get_calendars_by_owner(calendar.owner_id)
        .await?;
    check_calendar(&calendar, &owned)?;

    state
        .calendars
        .update_calendar(&calendar)
        .await
        .map_err(title_conflict)?;

    tracing::info!(calendar_id = %id, user_id = %user.id, "Updated calendar");

    Ok(Json(calendar))
}

/// Delete a calendar and every grant on it (DELETE /calendars/{id}).
pub async fn delete_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let ctx = load_calendar(&state, id, &user).await?;
    ctx.authorize(CalendarAction::Delete)?;

    state.calendars.delete_calendar(id).await?;

    tracing::info!(calendar_id = %id, user_id = %user.id, "Deleted calendar and its grants");

    Ok(StatusCode::NO_CONTENT)
}
