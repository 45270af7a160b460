//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Timestamps are stored as fixed-width RFC 3339 text so
//! `ORDER BY created_at` sorts chronologically.

/// Foreign keys are off by default in SQLite and must be enabled per connection.
pub const ENABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON;";

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_superuser INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS calendars (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (owner_id, title),
    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS calendar_access (
    id TEXT PRIMARY KEY,
    calendar_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('OWNER', 'MODERATOR', 'STANDARD', 'GUEST')),
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (calendar_id, user_id),
    FOREIGN KEY (calendar_id) REFERENCES calendars(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE SET NULL
);

-- At most one owner grant per calendar
CREATE UNIQUE INDEX IF NOT EXISTS idx_calendar_access_owner
    ON calendar_access(calendar_id) WHERE role = 'OWNER';
CREATE INDEX IF NOT EXISTS idx_calendar_access_user_id ON calendar_access(user_id);
CREATE INDEX IF NOT EXISTS idx_calendars_owner_id ON calendars(owner_id);
"#;

// ============================================================================
// User queries
// ============================================================================

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, name, password_hash, is_superuser, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, name, password_hash, is_superuser, created_at, updated_at
FROM users
WHERE email = ?1
"#;

pub const SELECT_USERS: &str = r#"
SELECT id, email, name, password_hash, is_superuser, created_at, updated_at
FROM users
ORDER BY created_at
"#;

pub const INSERT_USER: &str = r#"
INSERT INTO users (id, email, name, password_hash, is_superuser, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET email = ?2, name = ?3, password_hash = ?4, is_superuser = ?5, updated_at = ?6
WHERE id = ?1
"#;

// ============================================================================
// Calendar queries
// ============================================================================

pub const SELECT_CALENDAR_BY_ID: &str = r#"
SELECT id, owner_id, title, description, created_at, updated_at
FROM calendars
WHERE id = ?1
"#;

pub const SELECT_CALENDARS: &str = r#"
SELECT id, owner_id, title, description, created_at, updated_at
FROM calendars
ORDER BY created_at
"#;

pub const SELECT_CALENDARS_BY_OWNER: &str = r#"
SELECT id, owner_id, title, description, created_at, updated_at
FROM calendars
WHERE owner_id = ?1
ORDER BY created_at
"#;

pub const INSERT_CALENDAR: &str = r#"
INSERT INTO calendars (id, owner_id, title, description, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const UPDATE_CALENDAR: &str = r#"
UPDATE calendars
SET title = ?2, description = ?3, updated_at = ?4
WHERE id = ?1
"#;

pub const DELETE_CALENDAR: &str = "DELETE FROM calendars WHERE id = ?1";

// ============================================================================
// Access queries
// ============================================================================

pub const SELECT_ACCESS_BY_ID: &str = r#"
SELECT id, calendar_id, user_id, role, created_by, created_at, updated_at
FROM calendar_access
WHERE id = ?1
"#;

pub const SELECT_ACCESS_FOR_USER: &str = r#"
SELECT id, calendar_id, user_id, role, created_by, created_at, updated_at
FROM calendar_access
WHERE calendar_id = ?1 AND user_id = ?2
"#;

pub const SELECT_ACCESS: &str = r#"
SELECT id, calendar_id, user_id, role, created_by, created_at, updated_at
FROM calendar_access
ORDER BY created_at
"#;

pub const SELECT_ACCESS_BY_CALENDAR: &str = r#"
SELECT id, calendar_id, user_id, role, created_by, created_at, updated_at
FROM calendar_access
WHERE calendar_id = ?1
ORDER BY created_at
"#;

pub const SELECT_ACCESS_BY_USER: &str = r#"
SELECT id, calendar_id, user_id, role, created_by, created_at, updated_at
FROM calendar_access
WHERE user_id = ?1
ORDER BY created_at
"#;

pub const SELECT_CALENDARS_FOR_USER: &str = r#"
SELECT c.id, c.owner_id, c.title, c.description, c.created_at, c.updated_at, a.role
FROM calendars c
INNER JOIN calendar_access a ON a.calendar_id = c.id
WHERE a.user_id = ?1
ORDER BY c.created_at
"#;

pub const INSERT_ACCESS: &str = r#"
INSERT INTO calendar_access (id, calendar_id, user_id, role, created_by, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const UPDATE_ACCESS: &str = r#"
UPDATE calendar_access
SET role = ?2, updated_at = ?3
WHERE id = ?1
"#;

pub const DELETE_ACCESS: &str = "DELETE FROM calendar_access WHERE id = ?1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_covers_every_table() {
        for table in ["users", "calendars", "calendar_access"] {
            assert!(
                CREATE_TABLES.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
        assert!(CREATE_TABLES.contains("UNIQUE (calendar_id, user_id)"));
        assert!(CREATE_TABLES.contains("UNIQUE (owner_id, title)"));
        assert!(CREATE_TABLES.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn test_access_role_check_matches_role_names() {
        for role in chronal_core::calendar::CalendarRole::ALL {
            assert!(CREATE_TABLES.contains(&format!("'{}'", role.as_str())));
        }
    }

    #[test]
    fn test_list_queries_are_ordered() {
        for query in [
            SELECT_USERS,
            SELECT_CALENDARS,
            SELECT_CALENDARS_BY_OWNER,
            SELECT_ACCESS,
            SELECT_ACCESS_BY_CALENDAR,
            SELECT_ACCESS_BY_USER,
            SELECT_CALENDARS_FOR_USER,
        ] {
            assert!(query.contains("ORDER BY"));
        }
    }
}
