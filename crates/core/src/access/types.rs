use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{CalendarRole, User};

/// The authenticated user, as seen by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_superuser: true,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_superuser: user.is_superuser,
        }
    }
}

/// Something a user may try to do to a calendar or its grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarAction {
    View,
    ListAccess,
    Update,
    Delete,
    Grant,
    ChangeRole,
    Revoke,
}

impl CalendarAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::ListAccess => "list_access",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Grant => "grant",
            Self::ChangeRole => "change_role",
            Self::Revoke => "revoke",
        }
    }
}

impl std::fmt::Display for CalendarAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CalendarRole {
    /// Whether this role allows `action`.
    pub fn permits(&self, action: CalendarAction) -> bool {
        use CalendarAction::*;
        match self {
            CalendarRole::Owner => true,
            CalendarRole::Moderator => matches!(action, View | ListAccess | Revoke),
            CalendarRole::Standard | CalendarRole::Guest => matches!(action, View | ListAccess),
        }
    }

    /// The least privileged role that allows `action`.
    pub fn minimum_for(action: CalendarAction) -> CalendarRole {
        CalendarRole::ALL
            .iter()
            .rev()
            .copied()
            .find(|role| role.permits(action))
            .unwrap_or(CalendarRole::Owner)
    }
}
