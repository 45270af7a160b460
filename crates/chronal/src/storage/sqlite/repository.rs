//! SQLite repository implementation.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use chronal_core::calendar::{Calendar, CalendarAccess, CalendarRole, User};
use chronal_core::storage::{
    AccessRepository, CalendarRepository, RepositoryError, Result, UserRepository,
};

use super::conversions::{
    format_datetime, row_to_access, row_to_calendar, row_to_calendar_with_role, row_to_user,
};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Runs an UPDATE or DELETE and reports a missing row as `QueryReturnedNoRows`.
fn execute_one<P: rusqlite::Params>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
) -> std::result::Result<(), tokio_rusqlite::Error> {
    let rows = conn.execute(sql, params).map_err(wrap_err)?;
    if rows == 0 {
        return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
    }
    Ok(())
}

/// Collects every row a query returns.
fn query_all<T>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> std::result::Result<Vec<T>, tokio_rusqlite::Error> {
    let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
    let rows = stmt.query_map(params, map).map_err(wrap_err)?;
    rows.collect::<rusqlite::Result<Vec<T>>>().map_err(wrap_err)
}

/// SQLite-based repository implementation.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a database file and initializes the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository backed by an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::ENABLE_FOREIGN_KEYS)
                .map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_USER_BY_ID, [&id_str], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let lookup = email.clone();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_USER_BY_EMAIL, [&lookup], row_to_user)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", email))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.conn
            .call(|conn| query_all(conn, schema::SELECT_USERS, params![], row_to_user))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", "*"))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        let email = user.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    params![
                        user.id.to_string(),
                        user.email,
                        user.name,
                        user.password_hash,
                        user.is_superuser,
                        format_datetime(&user.created_at),
                        format_datetime(&user.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", email))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        let id = user.id;

        self.conn
            .call(move |conn| {
                execute_one(
                    conn,
                    schema::UPDATE_USER,
                    params![
                        user.id.to_string(),
                        user.email,
                        user.name,
                        user.password_hash,
                        user.is_superuser,
                        format_datetime(&user.updated_at),
                    ],
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User", id.to_string()))
    }
}

// ============================================================================
// CalendarRepository implementation
// ============================================================================

#[async_trait]
impl CalendarRepository for SqliteRepository {
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_CALENDAR_BY_ID, [&id_str], row_to_calendar)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", id.to_string()))
    }

    async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        self.conn
            .call(|conn| query_all(conn, schema::SELECT_CALENDARS, params![], row_to_calendar))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", "*"))
    }

    async fn get_calendars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Calendar>> {
        let owner_str = owner_id.to_string();

        self.conn
            .call(move |conn| {
                query_all(
                    conn,
                    schema::SELECT_CALENDARS_BY_OWNER,
                    [&owner_str],
                    row_to_calendar,
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", owner_id.to_string()))
    }

    async fn create_calendar(&self, calendar: &Calendar, owner: &CalendarAccess) -> Result<()> {
        if owner.calendar_id != calendar.id {
            return Err(RepositoryError::InvalidData(
                "Owner grant does not belong to the calendar".to_string(),
            ));
        }

        let calendar = calendar.clone();
        let owner = owner.clone();
        let id = calendar.id;

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(
                    schema::INSERT_CALENDAR,
                    params![
                        calendar.id.to_string(),
                        calendar.owner_id.to_string(),
                        calendar.title,
                        calendar.description,
                        format_datetime(&calendar.created_at),
                        format_datetime(&calendar.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                tx.execute(
                    schema::INSERT_ACCESS,
                    params![
                        owner.id.to_string(),
                        owner.calendar_id.to_string(),
                        owner.user_id.to_string(),
                        owner.role.as_str(),
                        owner.created_by.map(|u| u.to_string()),
                        format_datetime(&owner.created_at),
                        format_datetime(&owner.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", id.to_string()))
    }

    async fn update_calendar(&self, calendar: &Calendar) -> Result<()> {
        let calendar = calendar.clone();
        let id = calendar.id;

        self.conn
            .call(move |conn| {
                execute_one(
                    conn,
                    schema::UPDATE_CALENDAR,
                    params![
                        calendar.id.to_string(),
                        calendar.title,
                        calendar.description,
                        format_datetime(&calendar.updated_at),
                    ],
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", id.to_string()))
    }

    async fn delete_calendar(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        // Grants go with the calendar through ON DELETE CASCADE.
        self.conn
            .call(move |conn| execute_one(conn, schema::DELETE_CALENDAR, [&id_str]))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", id.to_string()))
    }
}

// ============================================================================
// AccessRepository implementation
// ============================================================================

#[async_trait]
impl AccessRepository for SqliteRepository {
    async fn get_access(&self, id: Uuid) -> Result<Option<CalendarAccess>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_ACCESS_BY_ID, [&id_str], row_to_access)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", id.to_string()))
    }

    async fn get_access_for_user(
        &self,
        calendar_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CalendarAccess>> {
        let calendar_str = calendar_id.to_string();
        let user_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(
                    schema::SELECT_ACCESS_FOR_USER,
                    [&calendar_str, &user_str],
                    row_to_access,
                )
                .optional()
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| {
                map_tokio_rusqlite_error(e, "CalendarAccess", format!("{calendar_id}/{user_id}"))
            })
    }

    async fn list_access(&self) -> Result<Vec<CalendarAccess>> {
        self.conn
            .call(|conn| query_all(conn, schema::SELECT_ACCESS, params![], row_to_access))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", "*"))
    }

    async fn list_access_for_calendar(&self, calendar_id: Uuid) -> Result<Vec<CalendarAccess>> {
        let calendar_str = calendar_id.to_string();

        self.conn
            .call(move |conn| {
                query_all(
                    conn,
                    schema::SELECT_ACCESS_BY_CALENDAR,
                    [&calendar_str],
                    row_to_access,
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", calendar_id.to_string()))
    }

    async fn list_access_for_user(&self, user_id: Uuid) -> Result<Vec<CalendarAccess>> {
        let user_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                query_all(conn, schema::SELECT_ACCESS_BY_USER, [&user_str], row_to_access)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", user_id.to_string()))
    }

    async fn get_calendars_for_user(&self, user_id: Uuid) -> Result<Vec<(Calendar, CalendarRole)>> {
        let user_str = user_id.to_string();

        self.conn
            .call(move |conn| {
                query_all(
                    conn,
                    schema::SELECT_CALENDARS_FOR_USER,
                    [&user_str],
                    row_to_calendar_with_role,
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Calendar", user_id.to_string()))
    }

    async fn create_access(&self, access: &CalendarAccess) -> Result<()> {
        let access = access.clone();
        let id = access.id;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ACCESS,
                    params![
                        access.id.to_string(),
                        access.calendar_id.to_string(),
                        access.user_id.to_string(),
                        access.role.as_str(),
                        access.created_by.map(|u| u.to_string()),
                        format_datetime(&access.created_at),
                        format_datetime(&access.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", id.to_string()))
    }

    async fn update_access(&self, access: &CalendarAccess) -> Result<()> {
        let access = access.clone();
        let id = access.id;

        self.conn
            .call(move |conn| {
                execute_one(
                    conn,
                    schema::UPDATE_ACCESS,
                    params![
                        access.id.to_string(),
                        access.role.as_str(),
                        format_datetime(&access.updated_at),
                    ],
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", id.to_string()))
    }

    async fn delete_access(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| execute_one(conn, schema::DELETE_ACCESS, [&id_str]))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "CalendarAccess", id.to_string()))
    }
}
