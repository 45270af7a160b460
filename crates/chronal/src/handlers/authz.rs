//! Authorization helpers for API handlers.
//!
//! Loads what the access policy needs (the calendar, the caller's role on it,
//! and the target grant) and hands the decision to `chronal_core::access`.
//! Missing calendars and grants are reported before any decision is made.

use uuid::Uuid;

use chronal_core::access::{authorize, CalendarAction, Principal};
use chronal_core::calendar::{Calendar, CalendarAccess, CalendarRole, User};

use super::AppError;
use crate::state::AppState;

/// A calendar as seen by the calling user.
#[derive(Debug, Clone)]
pub struct CalendarContext {
    pub calendar: Calendar,
    pub principal: Principal,
    /// The caller's role, `None` when they hold no grant.
    pub role: Option<CalendarRole>,
}

impl CalendarContext {
    /// Requires the caller to be allowed `action` on the calendar.
    pub fn authorize(&self, action: CalendarAction) -> Result<(), AppError> {
        authorize(&self.principal, self.role, self.calendar.id, action).map_err(|e| {
            tracing::debug!(
                calendar_id = %self.calendar.id,
                user_id = %self.principal.user_id,
                action = %action,
                "Calendar action refused"
            );
            AppError::from(e)
        })
    }
}

/// Loads a calendar and the caller's role on it. 404 if the calendar is missing.
pub async fn load_calendar(
    state: &AppState,
    calendar_id: Uuid,
    user: &User,
) -> Result<CalendarContext, AppError> {
    let calendar = state
        .calendars
        .get_calendar(calendar_id)
        .await?
        .ok_or(AppError::NotFound("Calendar"))?;

    let role = state
        .access
        .get_access_for_user(calendar_id, user.id)
        .await?
        .map(|grant| grant.role);

    Ok(CalendarContext {
        calendar,
        principal: Principal::from(user),
        role,
    })
}

/// Loads a grant that must belong to `calendar_id`. 404 otherwise.
pub async fn load_grant(
    state: &AppState,
    calendar_id: Uuid,
    access_id: Uuid,
) -> Result<CalendarAccess, AppError> {
    state
        .access
        .get_access(access_id)
        .await?
        .filter(|grant| grant.calendar_id == calendar_id)
        .ok_or(AppError::NotFound("Access"))
}
