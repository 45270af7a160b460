//! Calendar access policy.
//!
//! Every function here is a pure decision over the principal, the principal's
//! role on the calendar (`None` when they hold no grant), and the grant being
//! acted upon. Loading those inputs is the caller's job.

use uuid::Uuid;

use crate::calendar::{CalendarAccess, CalendarRole};

use super::{AccessError, CalendarAction, Principal};

/// Decides whether `principal` may perform `action` on a calendar.
///
/// Superusers may do anything. Everyone else needs a grant whose role
/// permits the action.
pub fn authorize(
    principal: &Principal,
    role: Option<CalendarRole>,
    calendar_id: Uuid,
    action: CalendarAction,
) -> Result<(), AccessError> {
    if principal.is_superuser {
        return Ok(());
    }
    match role {
        None => Err(AccessError::NoAccess { calendar_id }),
        Some(role) if role.permits(action) => Ok(()),
        Some(_) => Err(AccessError::InsufficientRole {
            calendar_id,
            required: CalendarRole::minimum_for(action),
        }),
    }
}

/// Decides whether `principal` may grant `requested` to a user.
///
/// `existing` is the target user's current grant on the calendar, if any.
pub fn authorize_grant(
    principal: &Principal,
    role: Option<CalendarRole>,
    calendar_id: Uuid,
    requested: CalendarRole,
    existing: Option<&CalendarAccess>,
) -> Result<(), AccessError> {
    authorize(principal, role, calendar_id, CalendarAction::Grant)?;
    if requested.is_owner() {
        return Err(AccessError::OwnerRoleNotGrantable { calendar_id });
    }
    if let Some(existing) = existing {
        return Err(AccessError::AlreadyGranted {
            calendar_id,
            user_id: existing.user_id,
        });
    }
    Ok(())
}

/// Decides whether `principal` may change `target` to `new_role`.
pub fn authorize_role_change(
    principal: &Principal,
    role: Option<CalendarRole>,
    target: &CalendarAccess,
    new_role: CalendarRole,
) -> Result<(), AccessError> {
    let calendar_id = target.calendar_id;
    authorize(principal, role, calendar_id, CalendarAction::ChangeRole)?;
    if target.role.is_owner() {
        return Err(AccessError::OwnerAccessImmutable { calendar_id });
    }
    if new_role.is_owner() {
        return Err(AccessError::OwnerRoleNotGrantable { calendar_id });
    }
    Ok(())
}

/// Decides whether `principal` may delete `target`.
///
/// Any non-owner may drop their own grant. The owner grant can never be
/// removed, not even by a superuser. Moderators may revoke standard and
/// guest grants only.
pub fn authorize_revoke(
    principal: &Principal,
    role: Option<CalendarRole>,
    target: &CalendarAccess,
) -> Result<(), AccessError> {
    let calendar_id = target.calendar_id;

    if target.user_id == principal.user_id {
        return if target.role.is_owner() {
            Err(AccessError::OwnerCannotLeave { calendar_id })
        } else {
            Ok(())
        };
    }

    if target.role.is_owner() {
        return Err(AccessError::OwnerAccessImmutable { calendar_id });
    }

    authorize(principal, role, calendar_id, CalendarAction::Revoke)?;

    if !principal.is_superuser
        && role == Some(CalendarRole::Moderator)
        && target.role.level() >= CalendarRole::Moderator.level()
    {
        return Err(AccessError::InsufficientRole {
            calendar_id,
            required: CalendarRole::Owner,
        });
    }

    Ok(())
}

/// Decides whether `principal` may read a single grant.
///
/// A grant is visible to its holder and to whoever issued it.
pub fn authorize_view_grant(
    principal: &Principal,
    grant: &CalendarAccess,
) -> Result<(), AccessError> {
    if principal.is_superuser
        || grant.user_id == principal.user_id
        || grant.created_by == Some(principal.user_id)
    {
        Ok(())
    } else {
        Err(AccessError::NoAccess {
            calendar_id: grant.calendar_id,
        })
    }
}

/// Requires `principal` to be a superuser.
pub fn require_superuser(principal: &Principal) -> Result<(), AccessError> {
    if principal.is_superuser {
        Ok(())
    } else {
        Err(AccessError::SuperuserRequired)
    }
}
