use async_trait::async_trait;
use uuid::Uuid;

use crate::calendar::{Calendar, CalendarAccess, CalendarRole, User};

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their email address (case-insensitive).
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists every user.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Creates a new user. Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Updates an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;
}

/// Repository for calendar operations.
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Gets a calendar by its ID.
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>>;

    /// Lists every calendar.
    async fn list_calendars(&self) -> Result<Vec<Calendar>>;

    /// Gets all calendars owned by a user.
    async fn get_calendars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Calendar>>;

    /// Creates a calendar together with its owner grant, atomically.
    async fn create_calendar(&self, calendar: &Calendar, owner: &CalendarAccess) -> Result<()>;

    /// Updates an existing calendar.
    async fn update_calendar(&self, calendar: &Calendar) -> Result<()>;

    /// Deletes a calendar and every grant on it.
    async fn delete_calendar(&self, id: Uuid) -> Result<()>;
}

/// Repository for calendar access grants.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Gets a grant by its ID.
    async fn get_access(&self, id: Uuid) -> Result<Option<CalendarAccess>>;

    /// Gets a user's grant on a calendar.
    async fn get_access_for_user(
        &self,
        calendar_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CalendarAccess>>;

    /// Lists every grant.
    async fn list_access(&self) -> Result<Vec<CalendarAccess>>;

    /// Lists all grants on a calendar.
    async fn list_access_for_calendar(&self, calendar_id: Uuid) -> Result<Vec<CalendarAccess>>;

    /// Lists all grants held by a user.
    async fn list_access_for_user(&self, user_id: Uuid) -> Result<Vec<CalendarAccess>>;

    /// Gets all calendars a user holds a grant on, with their roles.
    async fn get_calendars_for_user(&self, user_id: Uuid) -> Result<Vec<(Calendar, CalendarRole)>>;

    /// Creates a grant. Fails with `AlreadyExists` if the user already has one on the calendar.
    async fn create_access(&self, access: &CalendarAccess) -> Result<()>;

    /// Updates an existing grant.
    async fn update_access(&self, access: &CalendarAccess) -> Result<()>;

    /// Deletes a grant by its ID.
    async fn delete_access(&self, id: Uuid) -> Result<()>;
}
