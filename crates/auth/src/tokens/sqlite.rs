//! SQLite token storage implementation.

use async_trait::async_trait;
use chronal_core::auth::{AccessToken, AccessTokenRepository, AuthError, Result, TokenId};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// SQLite-backed token storage.
pub struct SqliteTokenStore {
    pool: SqlitePool,
}

/// Fixed-width UTC timestamps so `expires_at <= ?` compares correctly as text.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AuthError::Storage(e.to_string()))
}

impl SqliteTokenStore {
    /// Creates a new SQLite token store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS access_tokens (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_access_tokens_user_id ON access_tokens(user_id);
            CREATE INDEX IF NOT EXISTS idx_access_tokens_expires_at ON access_tokens(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl AccessTokenRepository for SqliteTokenStore {
    async fn create_token(&self, token: &AccessToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO access_tokens (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token.token.as_str())
        .bind(token.user_id.to_string())
        .bind(format_timestamp(token.created_at))
        .bind(format_timestamp(token.expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get_token(&self, id: &TokenId) -> Result<Option<AccessToken>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT token, user_id, created_at, expires_at FROM access_tokens WHERE token = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        match row {
            Some((token, user_id, created_at, expires_at)) => Ok(Some(AccessToken {
                token: TokenId::new(token),
                user_id: Uuid::parse_str(&user_id)
                    .map_err(|e| AuthError::Storage(e.to_string()))?,
                created_at: parse_timestamp(&created_at)?,
                expires_at: parse_timestamp(&expires_at)?,
            })),
            None => Ok(None),
        }
    }

    async fn delete_token(&self, id: &TokenId) -> Result<()> {
        sqlx::query("DELETE FROM access_tokens WHERE token = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn delete_user_tokens(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= ?")
            .bind(format_timestamp(now))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
