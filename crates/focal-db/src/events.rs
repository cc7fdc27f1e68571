//! Calendar event repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use focal_core::{
    CreateEventRequest, Error, Event, EventRepository, ListEventsRequest, Result,
    UpdateEventRequest,
};

const EVENT_COLUMNS: &str = "id, account_id, title, description, start_time, end_time, timezone, \
     is_all_day, event_type, status, location, is_online, meeting_url, attendees, \
     recurrence_rule, color, category, created_at, updated_at";

pub(crate) fn map_event(row: sqlx::postgres::PgRow) -> Event {
    let attendees: String = row.get("attendees");

    Event {
        id: row.get("id"),
        account_id: row.get("account_id"),
        title: row.get("title"),
        description: row.get("description"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        timezone: row.get("timezone"),
        is_all_day: row.get("is_all_day"),
        event_type: row.get("event_type"),
        status: row.get("status"),
        location: row.get("location"),
        is_online: row.get("is_online"),
        meeting_url: row.get("meeting_url"),
        attendees: serde_json::from_str(&attendees).unwrap_or_default(),
        recurrence_rule: row.get("recurrence_rule"),
        color: row.get("color"),
        category: row.get("category"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of EventRepository.
#[derive(Clone)]
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, account_id: Uuid, req: CreateEventRequest) -> Result<Event> {
        let id = Uuid::now_v7();
        let attendees_json = serde_json::to_string(&req.attendees)?;

        let row = sqlx::query(&format!(
            "INSERT INTO events (id, account_id, title, description, start_time, end_time, \
             timezone, is_all_day, event_type, status, location, is_online, meeting_url, \
             attendees, recurrence_rule, color, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(account_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.start_time)
        .bind(req.end_time)
        .bind(&req.timezone)
        .bind(req.is_all_day)
        .bind(&req.event_type)
        .bind(&req.status)
        .bind(&req.location)
        .bind(req.is_online)
        .bind(&req.meeting_url)
        .bind(&attendees_json)
        .bind(&req.recurrence_rule)
        .bind(&req.color)
        .bind(&req.category)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_event(row))
    }

    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE account_id = $1 AND id = $2"
        ))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_event))
    }

    async fn list(&self, account_id: Uuid, req: ListEventsRequest) -> Result<Vec<Event>> {
        let mut clauses = String::new();
        let mut idx = 2usize;

        if req.start.is_some() {
            clauses.push_str(&format!(" AND start_time >= ${idx}"));
            idx += 1;
        }
        if req.end.is_some() {
            clauses.push_str(&format!(" AND start_time < ${idx}"));
        }

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE account_id = $1{clauses} \
             ORDER BY start_time ASC"
        );

        let mut query = sqlx::query(&sql).bind(account_id);
        if let Some(start) = req.start {
            query = query.bind(start);
        }
        if let Some(end) = req.end {
            query = query.bind(end);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_event).collect())
    }

    async fn update(
        &self,
        account_id: Uuid,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> Result<Option<Event>> {
        if req.is_empty() {
            return self.fetch(account_id, id).await;
        }

        let attendees_json = match &req.attendees {
            Some(attendees) => Some(serde_json::to_string(attendees)?),
            None => None,
        };

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
        if req.start_time.is_some() {
            sets.push(format!("start_time = ${}", idx));
            idx += 1;
        }
        if req.end_time.is_some() {
            sets.push(format!("end_time = ${}", idx));
            idx += 1;
        }
        if req.timezone.is_some() {
            sets.push(format!("timezone = ${}", idx));
            idx += 1;
        }
        if req.is_all_day.is_some() {
            sets.push(format!("is_all_day = ${}", idx));
            idx += 1;
        }
        if req.event_type.is_some() {
            sets.push(format!("event_type = ${}", idx));
            idx += 1;
        }
        if req.status.is_some() {
            sets.push(format!("status = ${}", idx));
            idx += 1;
        }
        if req.location.is_some() {
            sets.push(format!("location = ${}", idx));
            idx += 1;
        }
        if req.is_online.is_some() {
            sets.push(format!("is_online = ${}", idx));
            idx += 1;
        }
        if req.meeting_url.is_some() {
            sets.push(format!("meeting_url = ${}", idx));
            idx += 1;
        }
        if attendees_json.is_some() {
            sets.push(format!("attendees = ${}", idx));
            idx += 1;
        }
        if req.recurrence_rule.is_some() {
            sets.push(format!("recurrence_rule = ${}", idx));
            idx += 1;
        }
        if req.color.is_some() {
            sets.push(format!("color = ${}", idx));
            idx += 1;
        }
        if req.category.is_some() {
            sets.push(format!("category = ${}", idx));
            idx += 1;
        }

        let sql = format!(
            "UPDATE events SET {}, updated_at = now() \
             WHERE account_id = ${} AND id = ${} RETURNING {EVENT_COLUMNS}",
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
        if let Some(v) = req.start_time {
            query = query.bind(v);
        }
        if let Some(v) = req.end_time {
            query = query.bind(v);
        }
        if let Some(v) = &req.timezone {
            query = query.bind(v);
        }
        if let Some(v) = req.is_all_day {
            query = query.bind(v);
        }
        if let Some(v) = &req.event_type {
            query = query.bind(v);
        }
        if let Some(v) = &req.status {
            query = query.bind(v);
        }
        if let Some(v) = &req.location {
            query = query.bind(v.as_deref());
        }
        if let Some(v) = req.is_online {
            query = query.bind(v);
        }
        if let Some(v) = &req.meeting_url {
            query = query.bind(v.as_deref());
        }
        if let Some(v) = &attendees_json {
            query = query.bind(v);
        }
        if let Some(v) = &req.recurrence_rule {
            query = query.bind(v.as_deref());
        }
        if let Some(v) = &req.color {
            query = query.bind(v);
        }
        if let Some(v) = &req.category {
            query = query.bind(v.as_deref());
        }

        let row = query
            .bind(account_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_event))
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE account_id = $1 AND id = $2")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
