use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use chronal_core::access::AccessError;
use chronal_core::calendar::CalendarError;
use chronal_core::http_mapping::{
    access_error_to_status_code, calendar_error_to_status_code, repository_error_to_status_code,
};
use chronal_core::storage::RepositoryError;

/// Error returned by calendar, access and user handlers.
///
/// Rendered as `{"msg": "..."}` with the status chosen by the core mapping
/// functions. Server errors hide their message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The request body was not the expected JSON.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// A path segment did not parse, such as a malformed UUID.
    #[error(transparent)]
    Path(#[from] PathRejection),

    /// A resource named in the path does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            AppError::Access(err) => access_error_to_status_code(err),
            AppError::Calendar(err) => calendar_error_to_status_code(err),
            AppError::Repository(err) => repository_error_to_status_code(err),
            AppError::Json(rejection) => rejection.status().as_u16(),
            AppError::Path(rejection) => rejection.status().as_u16(),
            AppError::NotFound(_) => 404,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            AppError::Access(AccessError::SuperuserRequired) => {
                tracing::warn!("Authorization denied: superuser required");
                self.to_string()
            }
            AppError::Access(err) => {
                tracing::warn!(error = %err, "Authorization denied");
                self.to_string()
            }
            AppError::Json(_) | AppError::Path(_) => {
                tracing::debug!(error = %self, status = %status, "Rejected malformed request");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "msg": message }))).into_response()
    }
}
