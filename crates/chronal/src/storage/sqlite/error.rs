//! SQLite error mapping.
//!
//! Translates `tokio_rusqlite::Error` and `rusqlite::Error` into
//! `RepositoryError`, keeping the entity type and id of the failed operation.

use chronal_core::storage::RepositoryError;
use rusqlite::{ffi, ErrorCode};

/// Maps a rusqlite error to a RepositoryError.
///
/// - `UNIQUE` and `PRIMARY KEY` violations → `AlreadyExists`
/// - `FOREIGN KEY` and `CHECK` violations → `InvalidData`
/// - Unopenable, busy or locked databases → `ConnectionFailed`
/// - No rows → `NotFound`
/// - Column conversion failures → `Serialization`
/// - Everything else → `QueryFailed`
pub fn map_rusqlite_error(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: &str,
) -> RepositoryError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _) => match sqlite_err.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                RepositoryError::already_exists(entity_type, id)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::InvalidData(format!(
                "{entity_type} {id} references a missing row"
            )),
            ffi::SQLITE_CONSTRAINT_CHECK => {
                RepositoryError::InvalidData(format!("{entity_type} {id} failed a check: {err}"))
            }
            _ => match sqlite_err.code {
                ErrorCode::CannotOpen | ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    RepositoryError::ConnectionFailed(err.to_string())
                }
                _ => RepositoryError::QueryFailed(err.to_string()),
            },
        },
        rusqlite::Error::QueryReturnedNoRows => RepositoryError::not_found(entity_type, id),
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            RepositoryError::Serialization(format!("{entity_type} {id}: {err}"))
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
///
/// `id` identifies what the operation was about: an entity id, or the owner or
/// calendar id for list queries.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl AsRef<str>,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id.as_ref())
        }
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}
