//! SQLite row conversion functions.
//!
//! Pure functions between SQLite rows and domain types, testable without a
//! database.

use std::str::FromStr;

use chronal_core::calendar::{Calendar, CalendarAccess, CalendarRole, User};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{types::Type, Row};
use uuid::Uuid;

/// Convert a SQLite row to a User.
///
/// Expected columns: id, email, name, password_hash, is_superuser, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(User {
        id: parse_uuid(0, &id)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        is_superuser: row.get(4)?,
        created_at: parse_datetime(5, &created_at)?,
        updated_at: parse_datetime(6, &updated_at)?,
    })
}

/// Convert a SQLite row to a Calendar.
///
/// Expected columns: id, owner_id, title, description, created_at, updated_at
pub fn row_to_calendar(row: &Row) -> rusqlite::Result<Calendar> {
    let id: String = row.get(0)?;
    let owner_id: String = row.get(1)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Calendar {
        id: parse_uuid(0, &id)?,
        owner_id: parse_uuid(1, &owner_id)?,
        title: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(4, &created_at)?,
        updated_at: parse_datetime(5, &updated_at)?,
    })
}

/// Convert a joined row to a calendar and the user's role on it.
///
/// Expected columns: the calendar columns, then role
pub fn row_to_calendar_with_role(row: &Row) -> rusqlite::Result<(Calendar, CalendarRole)> {
    let calendar = row_to_calendar(row)?;
    let role: String = row.get(6)?;
    Ok((calendar, parse_role(6, &role)?))
}

/// Convert a SQLite row to a CalendarAccess.
///
/// Expected columns: id, calendar_id, user_id, role, created_by, created_at, updated_at
pub fn row_to_access(row: &Row) -> rusqlite::Result<CalendarAccess> {
    let id: String = row.get(0)?;
    let calendar_id: String = row.get(1)?;
    let user_id: String = row.get(2)?;
    let role: String = row.get(3)?;
    let created_by: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(CalendarAccess {
        id: parse_uuid(0, &id)?,
        calendar_id: parse_uuid(1, &calendar_id)?,
        user_id: parse_uuid(2, &user_id)?,
        role: parse_role(3, &role)?,
        created_by: created_by.map(|s| parse_uuid(4, &s)).transpose()?,
        created_at: parse_datetime(5, &created_at)?,
        updated_at: parse_datetime(6, &updated_at)?,
    })
}

/// Nanosecond precision keeps timestamps lossless and fixed-width.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn parse_uuid(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_error(column, e))
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn parse_role(column: usize, s: &str) -> rusqlite::Result<CalendarRole> {
    CalendarRole::from_str(s).map_err(|e| conversion_error(column, e))
}
