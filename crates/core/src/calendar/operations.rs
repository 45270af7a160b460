use uuid::Uuid;

use super::error::{CalendarError, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use super::types::Calendar;

/// Validates a calendar before creation or update.
pub fn validate_calendar(calendar: &Calendar) -> Result<(), CalendarError> {
    if calendar.title.trim().is_empty() {
        return Err(CalendarError::EmptyTitle);
    }
    if calendar.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CalendarError::TitleTooLong);
    }
    if let Some(description) = &calendar.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CalendarError::DescriptionTooLong);
        }
    }
    Ok(())
}

/// Returns true if another calendar in `existing` already uses `title`.
///
/// `existing` is expected to hold the calendars of a single owner. The
/// calendar identified by `exclude_id` is ignored so an update can keep its
/// own title.
pub fn is_title_taken(existing: &[Calendar], title: &str, exclude_id: Option<Uuid>) -> bool {
    let title = title.trim();
    existing
        .iter()
        .filter(|calendar| exclude_id != Some(calendar.id))
        .any(|calendar| calendar.title.trim() == title)
}

/// Validates a calendar and checks its title against the owner's other calendars.
pub fn check_calendar(
    calendar: &Calendar,
    owner_calendars: &[Calendar],
) -> Result<(), CalendarError> {
    validate_calendar(calendar)?;
    if is_title_taken(owner_calendars, &calendar.title, Some(calendar.id)) {
        return Err(CalendarError::DuplicateTitle);
    }
    Ok(())
}
