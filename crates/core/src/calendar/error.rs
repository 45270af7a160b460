use thiserror::Error;

/// Maximum calendar title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum calendar description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Errors that can occur when validating or manipulating calendars.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Calendar title cannot be empty")]
    EmptyTitle,
    #[error("Calendar title too long (max 255 characters)")]
    TitleTooLong,
    #[error("Calendar description too long (max 1024 characters)")]
    DescriptionTooLong,
    #[error("Calendar with this title already exists")]
    DuplicateTitle,
}
