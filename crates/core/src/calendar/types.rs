use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Argon2 PHC string. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh ID. The email is stored lowercase.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into().to_lowercase(),
            name: name.into(),
            password_hash: password_hash.into(),
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A calendar owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Calendar {
    /// Create a new calendar with a generated ID.
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the calendar description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a specific ID (useful for testing or deserialization).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Role a user holds on a calendar, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarRole {
    Owner,
    Moderator,
    Standard,
    #[default]
    Guest,
}

impl CalendarRole {
    /// All roles, most privileged first.
    pub const ALL: [CalendarRole; 4] = [
        CalendarRole::Owner,
        CalendarRole::Moderator,
        CalendarRole::Standard,
        CalendarRole::Guest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Moderator => "MODERATOR",
            Self::Standard => "STANDARD",
            Self::Guest => "GUEST",
        }
    }

    /// Numeric rank, higher is more privileged.
    pub fn level(&self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Moderator => 2,
            Self::Standard => 1,
            Self::Guest => 0,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl fmt::Display for CalendarRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown calendar role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for CalendarRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "MODERATOR" => Ok(Self::Moderator),
            "STANDARD" => Ok(Self::Standard),
            "GUEST" => Ok(Self::Guest),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// A grant of a role on one calendar to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAccess {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub user_id: Uuid,
    pub role: CalendarRole,
    /// The user who issued the grant. `None` once that user is gone.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarAccess {
    pub fn new(calendar_id: Uuid, user_id: Uuid, role: CalendarRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            calendar_id,
            user_id,
            role,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The owner grant that accompanies every new calendar.
    pub fn owner(calendar: &Calendar) -> Self {
        Self::new(calendar.id, calendar.owner_id, CalendarRole::Owner)
            .with_created_by(calendar.owner_id)
    }

    pub fn with_created_by(mut self, created_by: Uuid) -> Self {
        self.created_by = Some(created_by);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_uppercase() {
        let json = serde_json::to_string(&CalendarRole::Moderator).unwrap();
        assert_eq!(json, "\"MODERATOR\"");

        let role: CalendarRole = serde_json::from_str("\"GUEST\"").unwrap();
        assert_eq!(role, CalendarRole::Guest);
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("owner".parse::<CalendarRole>(), Ok(CalendarRole::Owner));
        assert_eq!("Standard".parse::<CalendarRole>(), Ok(CalendarRole::Standard));
        assert_eq!(
            "admin".parse::<CalendarRole>(),
            Err(ParseRoleError("admin".to_string()))
        );
    }

    #[test]
    fn test_role_levels_are_strictly_ordered() {
        let levels: Vec<u8> = CalendarRole::ALL.iter().map(|r| r.level()).collect();
        assert!(levels.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(CalendarRole::default(), CalendarRole::Guest);
    }

    #[test]
    fn test_user_email_is_lowercased_and_hash_hidden() {
        let user = User::new("Alice@Example.COM", "alice", "$argon2id$secret");
        assert_eq!(user.email, "alice@example.com");

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["is_superuser"], false);
    }

    #[test]
    fn test_owner_access_matches_calendar() {
        let owner = Uuid::new_v4();
        let calendar = Calendar::new(owner, "Work").with_description("Shifts");
        let access = CalendarAccess::owner(&calendar);

        assert_eq!(access.calendar_id, calendar.id);
        assert_eq!(access.user_id, owner);
        assert_eq!(access.role, CalendarRole::Owner);
        assert_eq!(access.created_by, Some(owner));
    }
}
