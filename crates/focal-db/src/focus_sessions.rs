//! Focus session repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    CompleteFocusSessionRequest, CreateFocusSessionRequest, Error, FocusSession,
    FocusSessionRepository, FocusSessionStatus, Result,
};

const SESSION_COLUMNS: &str = "id, account_id, task_id, session_type, planned_duration, \
     actual_duration, status, quality_rating, notes, interruptions, focus_score, started_at, \
     ended_at, created_at";

/// Focus score recorded when a completing client does not report one.
const DEFAULT_FOCUS_SCORE: f64 = 7.0;

fn map_session(row: sqlx::postgres::PgRow) -> FocusSession {
    let session_type: String = row.get("session_type");
    let status: String = row.get("status");

    FocusSession {
        id: row.get("id"),
        account_id: row.get("account_id"),
        task_id: row.get("task_id"),
        session_type: session_type.parse().unwrap_or_default(),
        planned_duration: row.get("planned_duration"),
        actual_duration: row.get("actual_duration"),
        status: status.parse().unwrap_or_default(),
        quality_rating: row.get("quality_rating"),
        notes: row.get("notes"),
        interruptions: row.get("interruptions"),
        focus_score: row.get("focus_score"),
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of FocusSessionRepository.
#[derive(Clone)]
pub struct PgFocusSessionRepository {
    pool: Pool<Postgres>,
}

impl PgFocusSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FocusSessionRepository for PgFocusSessionRepository {
    async fn insert(
        &self,
        account_id: Uuid,
        req: CreateFocusSessionRequest,
    ) -> Result<FocusSession> {
        let id = Uuid::now_v7();

        let row = sqlx::query(&format!(
            "INSERT INTO focus_sessions (id, account_id, task_id, session_type, \
             planned_duration, notes, status, started_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'active', now()) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(req.task_id)
        .bind(req.session_type.to_string())
        .bind(req.planned_duration)
        .bind(&req.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_session(row))
    }

    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<FocusSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM focus_sessions WHERE account_id = $1 AND id = $2"
        ))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_session))
    }

    async fn list(
        &self,
        account_id: Uuid,
        status: Option<FocusSessionStatus>,
        limit: i64,
    ) -> Result<Vec<FocusSession>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {SESSION_COLUMNS} FROM focus_sessions \
                     WHERE account_id = $1 AND status = $2 \
                     ORDER BY created_at DESC LIMIT $3"
                ))
                .bind(account_id)
                .bind(status.to_string())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {SESSION_COLUMNS} FROM focus_sessions WHERE account_id = $1 \
                     ORDER BY created_at DESC LIMIT $2"
                ))
                .bind(account_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_session).collect())
    }

    async fn complete(
        &self,
        account_id: Uuid,
        id: Uuid,
        req: CompleteFocusSessionRequest,
    ) -> Result<Option<FocusSession>> {
        // Guarding on status makes re-completion a no-match rather than a
        // second duration write.
        let row = sqlx::query(&format!(
            "UPDATE focus_sessions SET \
             status = 'completed', \
             ended_at = now(), \
             actual_duration = FLOOR(EXTRACT(EPOCH FROM (now() - started_at)) / 60)::INTEGER, \
             quality_rating = $3, \
             notes = COALESCE($4, notes), \
             interruptions = COALESCE($5, 0), \
             focus_score = COALESCE($6, $7) \
             WHERE account_id = $1 AND id = $2 AND status = 'active' \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(account_id)
        .bind(id)
        .bind(req.quality_rating)
        .bind(&req.notes)
        .bind(req.interruptions)
        .bind(req.focus_score)
        .bind(DEFAULT_FOCUS_SCORE)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_session))
    }
}
