//! API request and response types for calendar operations.
//!
//! Following the Functional Core pattern, these are pure data types with no I/O.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Calendar, CalendarAccess, CalendarRole};
use crate::serde::{deserialize_optional_string, deserialize_trimmed_string};

/// Request payload for creating a new calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarRequest {
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
}

impl CreateCalendarRequest {
    /// Create a new request with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// Set the calendar description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Convert into a Calendar owned by `owner_id`.
    pub fn into_calendar(self, owner_id: Uuid) -> Calendar {
        let mut calendar = Calendar::new(owner_id, self.title);
        calendar.description = self.description;
        calendar
    }
}

/// Request payload for updating a calendar. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCalendarRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateCalendarRequest {
    /// Create an empty update request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calendar title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the calendar description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Apply updates to an existing calendar.
    ///
    /// An empty description clears it.
    pub fn apply_to(self, calendar: &mut Calendar) {
        if let Some(title) = self.title {
            calendar.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            let description = description.trim();
            calendar.description = if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            };
        }
        calendar.updated_at = Utc::now();
    }
}

/// Request payload for granting a user access to a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantAccessRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: CalendarRole,
}

impl GrantAccessRequest {
    pub fn new(user_id: Uuid, role: CalendarRole) -> Self {
        Self { user_id, role }
    }

    /// Build the grant issued by `granted_by` on `calendar_id`.
    pub fn into_access(self, calendar_id: Uuid, granted_by: Uuid) -> CalendarAccess {
        CalendarAccess::new(calendar_id, self.user_id, self.role).with_created_by(granted_by)
    }
}

/// Request payload for changing the role of an existing grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAccessRequest {
    pub role: CalendarRole,
}

impl UpdateAccessRequest {
    /// Apply the new role to a grant.
    pub fn apply_to(self, access: &mut CalendarAccess) {
        access.role = self.role;
        access.updated_at = Utc::now();
    }
}

/// A calendar together with the requesting user's role on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWithRole {
    #[serde(flatten)]
    pub calendar: Calendar,
    pub role: CalendarRole,
}

impl From<(Calendar, CalendarRole)> for CalendarWithRole {
    fn from((calendar, role): (Calendar, CalendarRole)) -> Self {
        Self { calendar, role }
    }
}
