//! Pure functions for mapping core errors to HTTP status codes.
//!
//! Following the Functional Core pattern, the shell decides how to render an
//! error but the core decides what it means.

use crate::access::AccessError;
use crate::calendar::CalendarError;
use crate::storage::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use chronal_core::http_mapping::repository_error_to_status_code;
/// use chronal_core::storage::RepositoryError;
///
/// let error = RepositoryError::not_found("Calendar", "abc-123");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

/// Maps an [`AccessError`] to an HTTP status code.
///
/// Refusals are 403, requests that can never succeed are 400, and a
/// duplicate grant is a 409 conflict.
pub fn access_error_to_status_code(error: &AccessError) -> u16 {
    match error {
        AccessError::NoAccess { .. }
        | AccessError::InsufficientRole { .. }
        | AccessError::OwnerAccessImmutable { .. }
        | AccessError::SuperuserRequired => 403,
        AccessError::OwnerCannotLeave { .. } | AccessError::OwnerRoleNotGrantable { .. } => 400,
        AccessError::AlreadyGranted { .. } => 409,
    }
}

/// Maps a [`CalendarError`] to an HTTP status code.
pub fn calendar_error_to_status_code(error: &CalendarError) -> u16 {
    match error {
        CalendarError::EmptyTitle
        | CalendarError::TitleTooLong
        | CalendarError::DescriptionTooLong => 422,
        CalendarError::DuplicateTitle => 409,
    }
}

/// Maps an [`AuthError`](crate::auth::AuthError) to an HTTP status code.
#[cfg(feature = "auth")]
pub fn auth_error_to_status_code(error: &crate::auth::AuthError) -> u16 {
    use crate::auth::AuthError;

    match error {
        AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => 401,
        AuthError::EmailNotFound => 404,
        AuthError::WrongPassword => 400,
        AuthError::EmailInUse => 409,
        AuthError::InvalidEmail(_)
        | AuthError::PasswordTooShort(_)
        | AuthError::NameNotAllowed(_) => 422,
        AuthError::PasswordHash(_) | AuthError::Storage(_) => 500,
    }
}
