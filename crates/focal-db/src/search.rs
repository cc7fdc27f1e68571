//! Cross-entity substring search.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use focal_core::{Error, Result, SearchProvider, SearchResults};

use crate::escape_like;
use crate::events::map_event;
use crate::notes::map_note;
use crate::tasks::map_task;

/// PostgreSQL implementation of SearchProvider. Matches are plain ILIKE
/// substring hits; ranking is recency.
#[derive(Clone)]
pub struct PgSearchProvider {
    pool: Pool<Postgres>,
}

impl PgSearchProvider {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchProvider for PgSearchProvider {
    async fn search(
        &self,
        account_id: Uuid,
        query: &str,
        limit_per_kind: i64,
    ) -> Result<SearchResults> {
        let pattern = format!("%{}%", escape_like(query));

        let note_rows = sqlx::query(
            "SELECT id, account_id, title, body, content_type, note_type, emoji, tags, \
             category, character_count, word_count, reading_time, is_favorite, is_archived, \
             is_public, is_template, sentiment_score, sentiment_label, remote_page_id, \
             parent_note_id, last_accessed_at, created_at, updated_at \
             FROM notes WHERE account_id = $1 AND is_archived = FALSE \
             AND (title ILIKE $2 ESCAPE '\\' OR body ILIKE $2 ESCAPE '\\') \
             ORDER BY updated_at DESC LIMIT $3",
        )
        .bind(account_id)
        .bind(&pattern)
        .bind(limit_per_kind)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let task_rows = sqlx::query(
            "SELECT id, account_id, title, description, status, priority, progress, due_date, \
             start_date, estimated_hours, actual_hours, tags, category, project, parent_task_id, \
             completed_at, created_at, updated_at \
             FROM tasks WHERE account_id = $1 \
             AND (title ILIKE $2 ESCAPE '\\' OR description ILIKE $2 ESCAPE '\\') \
             ORDER BY updated_at DESC LIMIT $3",
        )
        .bind(account_id)
        .bind(&pattern)
        .bind(limit_per_kind)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let event_rows = sqlx::query(
            "SELECT id, account_id, title, description, start_time, end_time, timezone, \
             is_all_day, event_type, status, location, is_online, meeting_url, attendees, \
             recurrence_rule, color, category, created_at, updated_at \
             FROM events WHERE account_id = $1 \
             AND (title ILIKE $2 ESCAPE '\\' OR description ILIKE $2 ESCAPE '\\') \
             ORDER BY start_time DESC LIMIT $3",
        )
        .bind(account_id)
        .bind(&pattern)
        .bind(limit_per_kind)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(SearchResults {
            notes: note_rows.into_iter().map(map_note).collect(),
            tasks: task_rows.into_iter().map(map_task).collect(),
            events: event_rows.into_iter().map(map_event).collect(),
        })
    }
}
