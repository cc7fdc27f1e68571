//! Coaching insight repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{CreateInsightRequest, Error, Insight, InsightRepository, Result};

const INSIGHT_COLUMNS: &str = "id, account_id, insight_type, title, content, metadata, \
     confidence_score, is_read, is_actionable, expires_at, created_at";

fn map_insight(row: sqlx::postgres::PgRow) -> Insight {
    let metadata: String = row.get("metadata");

    Insight {
        id: row.get("id"),
        account_id: row.get("account_id"),
        insight_type: row.get("insight_type"),
        title: row.get("title"),
        content: row.get("content"),
        metadata: serde_json::from_str(&metadata)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new())),
        confidence_score: row.get("confidence_score"),
        is_read: row.get("is_read"),
        is_actionable: row.get("is_actionable"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of InsightRepository.
#[derive(Clone)]
pub struct PgInsightRepository {
    pool: Pool<Postgres>,
}

impl PgInsightRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsightRepository for PgInsightRepository {
    async fn insert(&self, account_id: Uuid, req: CreateInsightRequest) -> Result<Insight> {
        let id = Uuid::now_v7();
        let metadata_json = serde_json::to_string(&req.metadata)?;

        let row = sqlx::query(&format!(
            "INSERT INTO insights (id, account_id, insight_type, title, content, metadata, \
             confidence_score, is_actionable, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {INSIGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(&req.insight_type)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&metadata_json)
        .bind(req.confidence_score)
        .bind(req.is_actionable)
        .bind(req.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_insight(row))
    }

    async fn list(&self, account_id: Uuid, limit: i64) -> Result<Vec<Insight>> {
        let rows = sqlx::query(&format!(
            "SELECT {INSIGHT_COLUMNS} FROM insights WHERE account_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_insight).collect())
    }

    async fn latest(&self, account_id: Uuid, insight_type: &str) -> Result<Option<Insight>> {
        let row = sqlx::query(&format!(
            "SELECT {INSIGHT_COLUMNS} FROM insights \
             WHERE account_id = $1 AND insight_type = $2 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(account_id)
        .bind(insight_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_insight))
    }
}
