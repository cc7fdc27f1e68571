//! Account repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    Account, AccountRepository, CreateAccountRequest, Error, Result, UpdateSettingsRequest,
};

const ACCOUNT_COLUMNS: &str = "id, email, username, password_hash, avatar_url, theme, timezone, \
     language, plan, work_start_time, work_end_time, break_duration, focus_session_duration, \
     ai_coaching_enabled, ai_notifications_enabled, ai_analysis_frequency, notion_enabled, \
     github_enabled, last_login_at, created_at, updated_at";

pub(crate) fn map_account(row: sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        avatar_url: row.get("avatar_url"),
        theme: row.get("theme"),
        timezone: row.get("timezone"),
        language: row.get("language"),
        plan: row.get("plan"),
        work_start_time: row.get("work_start_time"),
        work_end_time: row.get("work_end_time"),
        break_duration: row.get("break_duration"),
        focus_session_duration: row.get("focus_session_duration"),
        ai_coaching_enabled: row.get("ai_coaching_enabled"),
        ai_notifications_enabled: row.get("ai_notifications_enabled"),
        ai_analysis_frequency: row.get("ai_analysis_frequency"),
        notion_enabled: row.get("notion_enabled"),
        github_enabled: row.get("github_enabled"),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of AccountRepository.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: Pool<Postgres>,
}

impl PgAccountRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(&self, req: CreateAccountRequest) -> Result<Account> {
        let id = Uuid::now_v7();

        let row = sqlx::query(&format!(
            "INSERT INTO accounts (id, email, username, password_hash, avatar_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.email)
        .bind(&req.username)
        .bind(&req.password_hash)
        .bind(&req.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_account(row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_account))
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_account))
    }

    async fn record_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_login_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn update_settings(&self, id: Uuid, req: UpdateSettingsRequest) -> Result<Account> {
        if req.is_empty() {
            return self.fetch(id).await?.ok_or(Error::AccountNotFound(id));
        }

        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1usize;

        if req.theme.is_some() {
            sets.push(format!("theme = ${}", idx));
            idx += 1;
        }
        if req.timezone.is_some() {
            sets.push(format!("timezone = ${}", idx));
            idx += 1;
        }
        if req.language.is_some() {
            sets.push(format!("language = ${}", idx));
            idx += 1;
        }
        if req.work_start_time.is_some() {
            sets.push(format!("work_start_time = ${}", idx));
            idx += 1;
        }
        if req.work_end_time.is_some() {
            sets.push(format!("work_end_time = ${}", idx));
            idx += 1;
        }
        if req.break_duration.is_some() {
            sets.push(format!("break_duration = ${}", idx));
            idx += 1;
        }
        if req.focus_session_duration.is_some() {
            sets.push(format!("focus_session_duration = ${}", idx));
            idx += 1;
        }
        if req.ai_coaching_enabled.is_some() {
            sets.push(format!("ai_coaching_enabled = ${}", idx));
            idx += 1;
        }
        if req.ai_notifications_enabled.is_some() {
            sets.push(format!("ai_notifications_enabled = ${}", idx));
            idx += 1;
        }
        if req.ai_analysis_frequency.is_some() {
            sets.push(format!("ai_analysis_frequency = ${}", idx));
            idx += 1;
        }

        let sql = format!(
            "UPDATE accounts SET {}, updated_at = now() WHERE id = ${} RETURNING {ACCOUNT_COLUMNS}",
            sets.join(", "),
            idx
        );

        let mut query = sqlx::query(&sql);
        if let Some(v) = &req.theme {
            query = query.bind(v);
        }
        if let Some(v) = &req.timezone {
            query = query.bind(v);
        }
        if let Some(v) = &req.language {
            query = query.bind(v);
        }
        if let Some(v) = &req.work_start_time {
            query = query.bind(v);
        }
        if let Some(v) = &req.work_end_time {
            query = query.bind(v);
        }
        if let Some(v) = req.break_duration {
            query = query.bind(v);
        }
        if let Some(v) = req.focus_session_duration {
            query = query.bind(v);
        }
        if let Some(v) = req.ai_coaching_enabled {
            query = query.bind(v);
        }
        if let Some(v) = req.ai_notifications_enabled {
            query = query.bind(v);
        }
        if let Some(v) = &req.ai_analysis_frequency {
            query = query.bind(v);
        }

        let row = query
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(map_account).ok_or(Error::AccountNotFound(id))
    }
}
