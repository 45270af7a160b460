mod error;
mod operations;
mod requests;
mod types;

pub use error::{CalendarError, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use operations::{check_calendar, is_title_taken, validate_calendar};
pub use requests::{
    CalendarWithRole, CreateCalendarRequest, GrantAccessRequest, UpdateAccessRequest,
    UpdateCalendarRequest,
};
pub use types::{Calendar, CalendarAccess, CalendarRole, ParseRoleError, User};
