//! Task repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    CreateTaskRequest, Error, ListTasksRequest, Result, Task, TaskRepository, TaskStatus,
    UpdateTaskRequest,
};

const TASK_COLUMNS: &str = "id, account_id, title, description, status, priority, progress, \
     due_date, start_date, estimated_hours, actual_hours, tags, category, project, \
     parent_task_id, completed_at, created_at, updated_at";

/// Priority rank for list ordering, urgent first.
const PRIORITY_ORDER: &str =
    "CASE priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END";

pub(crate) fn map_task(row: sqlx::postgres::PgRow) -> Task {
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    let tags: String = row.get("tags");

    Task {
        id: row.get("id"),
        account_id: row.get("account_id"),
        title: row.get("title"),
        description: row.get("description"),
        status: status.parse().unwrap_or_default(),
        priority: priority.parse().unwrap_or_default(),
        progress: row.get("progress"),
        due_date: row.get("due_date"),
        start_date: row.get("start_date"),
        estimated_hours: row.get("estimated_hours"),
        actual_hours: row.get("actual_hours"),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        category: row.get("category"),
        project: row.get("project"),
        parent_task_id: row.get("parent_task_id"),
        completed_at: row.get("completed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of TaskRepository.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: Pool<Postgres>,
}

impl PgTaskRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, account_id: Uuid, req: CreateTaskRequest) -> Result<Task> {
        let id = Uuid::now_v7();
        let tags_json = serde_json::to_string(&req.tags)?;

        let row = sqlx::query(&format!(
            "INSERT INTO tasks (id, account_id, title, description, status, priority, due_date, \
             start_date, estimated_hours, tags, category, project, parent_task_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.status.to_string())
        .bind(req.priority.to_string())
        .bind(req.due_date)
        .bind(req.start_date)
        .bind(req.estimated_hours)
        .bind(&tags_json)
        .bind(&req.category)
        .bind(&req.project)
        .bind(req.parent_task_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_task(row))
    }

    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE account_id = $1 AND id = $2"
        ))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_task))
    }

    async fn list(&self, account_id: Uuid, req: ListTasksRequest) -> Result<Vec<Task>> {
        let mut clauses = String::new();
        let mut idx = 2usize;

        if req.status.is_some() {
            clauses.push_str(&format!(" AND status = ${idx}"));
            idx += 1;
        }
        if req.priority.is_some() {
            clauses.push_str(&format!(" AND priority = ${idx}"));
            idx += 1;
        }
        if req.project.is_some() {
            clauses.push_str(&format!(" AND project = ${idx}"));
        }

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE account_id = $1{clauses} \
             ORDER BY {PRIORITY_ORDER}, due_date ASC NULLS LAST, created_at DESC"
        );

        let mut query = sqlx::query(&sql).bind(account_id);
        if let Some(status) = req.status {
            query = query.bind(status.to_string());
        }
        if let Some(priority) = req.priority {
            query = query.bind(priority.to_string());
        }
        if let Some(project) = &req.project {
            query = query.bind(project);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_task).collect())
    }

    async fn update(
        &self,
        account_id: Uuid,
        id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<Option<Task>> {
        if req.is_empty() {
            return self.fetch(account_id, id).await;
        }

        let tags_json = match &req.tags {
            Some(tags) => Some(serde_json::to_string(tags)?),
            None => None,
        };
        // First transition into completed stamps completed_at and forces
        // progress to 100; re-completing an already stamped task does not.
        let completing = req.status == Some(TaskStatus::Completed);

        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1usize;

        if req.title.is_some() {
            sets.push(format!("title = ${}", idx));
            idx += 1;
        }
        if req.description.is_some() {
            sets.push(format!("description = ${}", idx));
            idx += 1;
        }
        if req.status.is_some() {
            sets.push(format!("status = ${}", idx));
            idx += 1;
        }
        if completing {
            sets.push("completed_at = COALESCE(completed_at, now())".to_string());
        }
        if req.priority.is_some() {
            sets.push(format!("priority = ${}", idx));
            idx += 1;
        }
        match (completing, req.progress.is_some()) {
            (true, true) => {
                sets.push(format!(
                    "progress = CASE WHEN completed_at IS NULL THEN 100 ELSE ${} END",
                    idx
                ));
                idx += 1;
            }
            (true, false) => {
                sets.push("progress = CASE WHEN completed_at IS NULL THEN 100 ELSE progress END"
                    .to_string());
            }
            (false, true) => {
                sets.push(format!("progress = ${}", idx));
                idx += 1;
            }
            (false, false) => {}
        }
        if req.due_date.is_some() {
            sets.push(format!("due_date = ${}", idx));
            idx += 1;
        }
        if req.start_date.is_some() {
            sets.push(format!("start_date = ${}", idx));
            idx += 1;
        }
        if req.estimated_hours.is_some() {
            sets.push(format!("estimated_hours = ${}", idx));
            idx += 1;
        }
        if req.actual_hours.is_some() {
            sets.push(format!("actual_hours = ${}", idx));
            idx += 1;
        }
        if tags_json.is_some() {
            sets.push(format!("tags = ${}", idx));
            idx += 1;
        }
        if req.category.is_some() {
            sets.push(format!("category = ${}", idx));
            idx += 1;
        }
        if req.project.is_some() {
            sets.push(format!("project = ${}", idx));
            idx += 1;
        }

        let sql = format!(
            "UPDATE tasks SET {}, updated_at = now() \
             WHERE account_id = ${} AND id = ${} RETURNING {TASK_COLUMNS}",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut query = sqlx::query(&sql);
        if let Some(v) = &req.title {
            query = query.bind(v);
        }
        if let Some(v) = &req.description {
            query = query.bind(v);
        }
        if let Some(v) = req.status {
            query = query.bind(v.to_string());
        }
        if let Some(v) = req.priority {
            query = query.bind(v.to_string());
        }
        if let Some(v) = req.progress {
            query = query.bind(v);
        }
        if let Some(v) = req.due_date {
            query = query.bind(v);
        }
        if let Some(v) = req.start_date {
            query = query.bind(v);
        }
        if let Some(v) = req.estimated_hours {
            query = query.bind(v);
        }
        if let Some(v) = req.actual_hours {
            query = query.bind(v);
        }
        if let Some(v) = &tags_json {
            query = query.bind(v);
        }
        if let Some(v) = &req.category {
            query = query.bind(v.as_deref());
        }
        if let Some(v) = &req.project {
            query = query.bind(v.as_deref());
        }

        let row = query
            .bind(account_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_task))
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent_titles(&self, account_id: Uuid, limit: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT title FROM tasks WHERE account_id = $1 \
             ORDER BY updated_at DESC, id DESC LIMIT $2",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("title")).collect())
    }
}
