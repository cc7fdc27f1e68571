//! Read-side aggregation queries feeding the analytics engine.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    ActivityWindow, AnalyticsRepository, CategoryCount, CategoryHistograms, Error, Result,
    SessionSample, TaskTotals,
};

/// PostgreSQL implementation of AnalyticsRepository.
///
/// Timestamps are bucketed by their UTC calendar date, matching the
/// date arithmetic in focal-core's analytics engine.
#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: Pool<Postgres>,
}

impl PgAnalyticsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn count_scalar(&self, sql: &str, account_id: Uuid) -> Result<i64> {
        let row = sqlx::query(sql)
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("count"))
    }

    async fn count_since(
        &self,
        sql: &str,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        let row = sqlx::query(sql)
            .bind(account_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn task_totals(&self, account_id: Uuid) -> Result<TaskTotals> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'completed') AS completed, \
             COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress \
             FROM tasks WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(TaskTotals {
            total: row.get("total"),
            completed: row.get("completed"),
            in_progress: row.get("in_progress"),
        })
    }

    async fn active_note_count(&self, account_id: Uuid) -> Result<i64> {
        self.count_scalar(
            "SELECT COUNT(*) AS count FROM notes WHERE account_id = $1 AND is_archived = FALSE",
            account_id,
        )
        .await
    }

    async fn activity_window(
        &self,
        account_id: Uuid,
        end: NaiveDate,
        days: u32,
    ) -> Result<ActivityWindow> {
        if days == 0 {
            return Ok(ActivityWindow {
                end,
                days,
                task_completions: Vec::new(),
                note_creations: Vec::new(),
                sessions: Vec::new(),
            });
        }
        let start = end - Duration::days(i64::from(days) - 1);

        let completion_rows = sqlx::query(
            "SELECT (completed_at AT TIME ZONE 'UTC')::date AS day FROM tasks \
             WHERE account_id = $1 AND completed_at IS NOT NULL \
             AND (completed_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3",
        )
        .bind(account_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let creation_rows = sqlx::query(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day FROM notes \
             WHERE account_id = $1 \
             AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3",
        )
        .bind(account_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let session_rows = sqlx::query(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, \
             COALESCE(actual_duration, 0) AS minutes, focus_score FROM focus_sessions \
             WHERE account_id = $1 AND status = 'completed' \
             AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3",
        )
        .bind(account_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ActivityWindow {
            end,
            days,
            task_completions: completion_rows
                .into_iter()
                .map(|row| row.get("day"))
                .collect(),
            note_creations: creation_rows.into_iter().map(|row| row.get("day")).collect(),
            sessions: session_rows
                .into_iter()
                .map(|row| SessionSample {
                    date: row.get("day"),
                    minutes: i64::from(row.get::<i32, _>("minutes")),
                    focus_score: row.get("focus_score"),
                })
                .collect(),
        })
    }

    async fn category_histograms(&self, account_id: Uuid) -> Result<CategoryHistograms> {
        let task_rows = sqlx::query(
            "SELECT COALESCE(category, 'Uncategorized') AS name, COUNT(*) AS count \
             FROM tasks WHERE account_id = $1 \
             GROUP BY COALESCE(category, 'Uncategorized') \
             ORDER BY count DESC, name ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note_rows = sqlx::query(
            "SELECT note_type AS name, COUNT(*) AS count \
             FROM notes WHERE account_id = $1 AND is_archived = FALSE \
             GROUP BY note_type \
             ORDER BY count DESC, name ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let to_counts = |rows: Vec<sqlx::postgres::PgRow>| {
            rows.into_iter()
                .map(|row| CategoryCount {
                    name: row.get("name"),
                    count: row.get("count"),
                })
                .collect()
        };

        Ok(CategoryHistograms {
            tasks: to_counts(task_rows),
            notes: to_counts(note_rows),
        })
    }

    async fn notes_created_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        self.count_since(
            "SELECT COUNT(*) AS count FROM notes WHERE account_id = $1 AND created_at >= $2",
            account_id,
            since,
        )
        .await
    }

    async fn tasks_completed_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        self.count_since(
            "SELECT COUNT(*) AS count FROM tasks \
             WHERE account_id = $1 AND status = 'completed' AND completed_at >= $2",
            account_id,
            since,
        )
        .await
    }

    async fn tasks_touched_since(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'completed') AS completed \
             FROM tasks WHERE account_id = $1 AND updated_at >= $2",
        )
        .bind(account_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((row.get("total"), row.get("completed")))
    }

    async fn notes_touched_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        self.count_since(
            "SELECT COUNT(*) AS count FROM notes WHERE account_id = $1 AND updated_at >= $2",
            account_id,
            since,
        )
        .await
    }

    async fn session_samples_since(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<SessionSample>> {
        let rows = sqlx::query(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, \
             COALESCE(actual_duration, 0) AS minutes, focus_score \
             FROM focus_sessions WHERE account_id = $1 AND created_at >= $2",
        )
        .bind(account_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| SessionSample {
                date: row.get("day"),
                minutes: i64::from(row.get::<i32, _>("minutes")),
                focus_score: row.get("focus_score"),
            })
            .collect())
    }
}
