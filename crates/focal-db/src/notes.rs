//! Note repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    BodyMetrics, CreateNoteRequest, Error, ListNotesRequest, Note, NotePage, NoteRepository,
    Result, UpdateNoteRequest,
};

use crate::escape_like;

const NOTE_COLUMNS: &str = "id, account_id, title, body, content_type, note_type, emoji, tags, \
     category, character_count, word_count, reading_time, is_favorite, is_archived, is_public, \
     is_template, sentiment_score, sentiment_label, remote_page_id, parent_note_id, \
     last_accessed_at, created_at, updated_at";

/// Default page size for note listings.
const DEFAULT_PER_PAGE: i64 = 20;

pub(crate) fn map_note(row: sqlx::postgres::PgRow) -> Note {
    let tags: String = row.get("tags");
    let sentiment_label: String = row.get("sentiment_label");

    Note {
        id: row.get("id"),
        account_id: row.get("account_id"),
        title: row.get("title"),
        body: row.get("body"),
        content_type: row.get("content_type"),
        note_type: row.get("note_type"),
        emoji: row.get("emoji"),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        category: row.get("category"),
        character_count: row.get("character_count"),
        word_count: row.get("word_count"),
        reading_time: row.get("reading_time"),
        is_favorite: row.get("is_favorite"),
        is_archived: row.get("is_archived"),
        is_public: row.get("is_public"),
        is_template: row.get("is_template"),
        sentiment_score: row.get("sentiment_score"),
        sentiment_label: sentiment_label.parse().unwrap_or_default(),
        remote_page_id: row.get("remote_page_id"),
        parent_note_id: row.get("parent_note_id"),
        last_accessed_at: row.get("last_accessed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Build the WHERE tail shared by the list page and count queries.
/// Parameters start at $2; $1 is the account id.
fn build_list_filter(req: &ListNotesRequest) -> (String, usize) {
    let mut clauses = String::new();
    let mut idx = 2usize;

    if req.search.is_some() {
        clauses.push_str(&format!(
            " AND (title ILIKE ${idx} ESCAPE '\\' OR body ILIKE ${idx} ESCAPE '\\')"
        ));
        idx += 1;
    }
    if req.category.is_some() {
        clauses.push_str(&format!(" AND category = ${idx}"));
        idx += 1;
    }
    if req.note_type.is_some() {
        clauses.push_str(&format!(" AND note_type = ${idx}"));
        idx += 1;
    }
    if req.favorite.is_some() {
        clauses.push_str(&format!(" AND is_favorite = ${idx}"));
        idx += 1;
    }

    (clauses, idx)
}

/// Bind the list filter parameters in the order build_list_filter numbered them.
fn bind_list_filter<'q>(
    mut query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    req: &'q ListNotesRequest,
    pattern: &'q Option<String>,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    if let Some(pattern) = pattern {
        query = query.bind(pattern);
    }
    if let Some(category) = &req.category {
        query = query.bind(category);
    }
    if let Some(note_type) = &req.note_type {
        query = query.bind(note_type);
    }
    if let Some(favorite) = req.favorite {
        query = query.bind(favorite);
    }
    query
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, account_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::now_v7();
        let metrics = BodyMetrics::of(&req.body);
        let tags_json = serde_json::to_string(&req.tags)?;

        let row = sqlx::query(&format!(
            "INSERT INTO notes (id, account_id, title, body, content_type, note_type, emoji, \
             tags, category, character_count, word_count, reading_time, is_template, \
             parent_note_id, sentiment_score, sentiment_label) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(&req.title)
        .bind(&req.body)
        .bind(&req.content_type)
        .bind(&req.note_type)
        .bind(&req.emoji)
        .bind(&tags_json)
        .bind(&req.category)
        .bind(metrics.character_count)
        .bind(metrics.word_count)
        .bind(metrics.reading_time)
        .bind(req.is_template)
        .bind(req.parent_note_id)
        .bind(req.sentiment.score)
        .bind(req.sentiment.label.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_note(row))
    }

    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE account_id = $1 AND id = $2"
        ))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_note))
    }

    async fn touch_access(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notes SET last_accessed_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self, account_id: Uuid, req: ListNotesRequest) -> Result<NotePage> {
        let page = req.page.unwrap_or(1).max(1);
        let per_page = req.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);

        let pattern = req
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));

        let (clauses, idx) = build_list_filter(&req);

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM notes \
             WHERE account_id = $1 AND is_archived = FALSE{clauses}"
        );
        let total: i64 = bind_list_filter(sqlx::query(&count_sql).bind(account_id), &req, &pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .get("total");

        let page_sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE account_id = $1 AND is_archived = FALSE{clauses} \
             ORDER BY updated_at DESC LIMIT ${} OFFSET ${}",
            idx,
            idx + 1
        );
        let rows = bind_list_filter(sqlx::query(&page_sql).bind(account_id), &req, &pattern)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(NotePage {
            notes: rows.into_iter().map(map_note).collect(),
            page,
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        })
    }

    async fn recent(&self, account_id: Uuid, limit: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE account_id = $1 AND is_archived = FALSE \
             ORDER BY updated_at DESC LIMIT $2"
        ))
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note).collect())
    }

    async fn update(
        &self,
        account_id: Uuid,
        id: Uuid,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        if req.is_empty() {
            return self.fetch(account_id, id).await;
        }

        let metrics = req.body.as_deref().map(BodyMetrics::of);
        let tags_json = match &req.tags {
            Some(tags) => Some(serde_json::to_string(tags)?),
            None => None,
        };

        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1usize;

        if req.title.is_some() {
            sets.push(format!("title = ${}", idx));
            idx += 1;
        }
        if req.body.is_some() {
            sets.push(format!("body = ${}", idx));
            sets.push(format!("character_count = ${}", idx + 1));
            sets.push(format!("word_count = ${}", idx + 2));
            sets.push(format!("reading_time = ${}", idx + 3));
            idx += 4;
        }
        if req.note_type.is_some() {
            sets.push(format!("note_type = ${}", idx));
            idx += 1;
        }
        if req.emoji.is_some() {
            sets.push(format!("emoji = ${}", idx));
            idx += 1;
        }
        if req.category.is_some() {
            sets.push(format!("category = ${}", idx));
            idx += 1;
        }
        if tags_json.is_some() {
            sets.push(format!("tags = ${}", idx));
            idx += 1;
        }
        if req.is_favorite.is_some() {
            sets.push(format!("is_favorite = ${}", idx));
            idx += 1;
        }
        if req.is_archived.is_some() {
            sets.push(format!("is_archived = ${}", idx));
            idx += 1;
        }
        if req.is_public.is_some() {
            sets.push(format!("is_public = ${}", idx));
            idx += 1;
        }
        if req.sentiment.is_some() {
            sets.push(format!("sentiment_score = ${}", idx));
            sets.push(format!("sentiment_label = ${}", idx + 1));
            idx += 2;
        }

        let sql = format!(
            "UPDATE notes SET {}, updated_at = now() \
             WHERE account_id = ${} AND id = ${} RETURNING {NOTE_COLUMNS}",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut query = sqlx::query(&sql);
        if let Some(v) = &req.title {
            query = query.bind(v);
        }
        if let Some(v) = &req.body {
            let m = metrics.as_ref().unwrap();
            query = query
                .bind(v)
                .bind(m.character_count)
                .bind(m.word_count)
                .bind(m.reading_time);
        }
        if let Some(v) = &req.note_type {
            query = query.bind(v);
        }
        if let Some(v) = &req.emoji {
            query = query.bind(v);
        }
        if let Some(v) = &req.category {
            query = query.bind(v.as_deref());
        }
        if let Some(v) = &tags_json {
            query = query.bind(v);
        }
        if let Some(v) = req.is_favorite {
            query = query.bind(v);
        }
        if let Some(v) = req.is_archived {
            query = query.bind(v);
        }
        if let Some(v) = req.is_public {
            query = query.bind(v);
        }
        if let Some(s) = &req.sentiment {
            query = query.bind(s.score).bind(s.label.to_string());
        }

        let row = query
            .bind(account_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_note))
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_remote_page(&self, id: Uuid, remote_page_id: &str) -> Result<()> {
        sqlx::query("UPDATE notes SET remote_page_id = $2 WHERE id = $1")
            .bind(id)
            .bind(remote_page_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list_templates(&self, account_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE account_id = $1 AND is_template = TRUE \
             ORDER BY updated_at DESC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note).collect())
    }

    async fn fetch_template(&self, account_id: Uuid, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE account_id = $1 AND id = $2 AND is_template = TRUE"
        ))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_note))
    }
}
