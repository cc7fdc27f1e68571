//! Bearer session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{Account, Error, Result, Session, SessionRepository};

use crate::accounts::map_account;

fn map_session(row: sqlx::postgres::PgRow) -> Session {
    Session {
        id: row.get("id"),
        account_id: row.get("account_id"),
        token_hash: row.get("token_hash"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(
        &self,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let id = Uuid::now_v7();

        let row = sqlx::query(
            "INSERT INTO sessions (id, account_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, account_id, token_hash, expires_at, created_at",
        )
        .bind(id)
        .bind(account_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_session(row))
    }

    async fn resolve(&self, token_hash: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, email, username, password_hash, avatar_url, theme, timezone, language, \
             plan, work_start_time, work_end_time, break_duration, focus_session_duration, \
             ai_coaching_enabled, ai_notifications_enabled, ai_analysis_frequency, \
             notion_enabled, github_enabled, last_login_at, created_at, updated_at \
             FROM accounts WHERE id = (\
                 SELECT account_id FROM sessions \
                 WHERE token_hash = $1 AND expires_at > now())",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_account))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<i64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() as i64)
    }
}
