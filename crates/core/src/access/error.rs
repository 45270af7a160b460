use thiserror::Error;
use uuid::Uuid;

use crate::calendar::CalendarRole;

/// Reasons an access decision can be refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("You don't have access to this calendar")]
    NoAccess { calendar_id: Uuid },

    #[error("Requires {required} role on this calendar")]
    InsufficientRole {
        calendar_id: Uuid,
        required: CalendarRole,
    },

    #[error("Owner cannot remove their own access")]
    OwnerCannotLeave { calendar_id: Uuid },

    #[error("The owner's access cannot be changed or removed")]
    OwnerAccessImmutable { calendar_id: Uuid },

    #[error("The OWNER role cannot be granted")]
    OwnerRoleNotGrantable { calendar_id: Uuid },

    #[error("User already has access to this calendar")]
    AlreadyGranted { calendar_id: Uuid, user_id: Uuid },

    #[error("Superuser privileges required")]
    SuperuserRequired,
}
