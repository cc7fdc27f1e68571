//! Core traits for focal abstractions.
//!
//! These traits define the interfaces the storage layer must satisfy,
//! keeping handlers and services decoupled from concrete SQL.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::analytics::{ActivityWindow, CategoryHistograms, SessionSample, TaskTotals};
use crate::error::Result;
use crate::models::*;

// =============================================================================
// ACCOUNT REPOSITORY TRAITS
// =============================================================================

/// Request for creating an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

/// Request for updating account settings. Only set fields change.
#[derive(Debug, Clone, Default)]
pub struct UpdateSettingsRequest {
    pub theme: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub work_start_time: Option<String>,
    pub work_end_time: Option<String>,
    pub break_duration: Option<i32>,
    pub focus_session_duration: Option<i32>,
    pub ai_coaching_enabled: Option<bool>,
    pub ai_notifications_enabled: Option<bool>,
    pub ai_analysis_frequency: Option<String>,
}

impl UpdateSettingsRequest {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.timezone.is_none()
            && self.language.is_none()
            && self.work_start_time.is_none()
            && self.work_end_time.is_none()
            && self.break_duration.is_none()
            && self.focus_session_duration.is_none()
            && self.ai_coaching_enabled.is_none()
            && self.ai_notifications_enabled.is_none()
            && self.ai_analysis_frequency.is_none()
    }
}

/// Repository for account records.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, req: CreateAccountRequest) -> Result<Account>;

    /// Fetch an account by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Account>>;

    /// Fetch an account by email.
    async fn fetch_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Stamp last_login_at with the current time.
    async fn record_login(&self, id: Uuid) -> Result<()>;

    /// Apply a partial settings update and return the fresh account.
    async fn update_settings(&self, id: Uuid, req: UpdateSettingsRequest) -> Result<Account>;
}

// =============================================================================
// SESSION REPOSITORY TRAITS
// =============================================================================

/// Repository for bearer sessions. Stores token digests, never tokens.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a session for an account.
    async fn insert(
        &self,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session>;

    /// Resolve a token digest to its account, ignoring expired sessions.
    async fn resolve(&self, token_hash: &str) -> Result<Option<Account>>;

    /// Delete the session with this token digest.
    async fn revoke(&self, token_hash: &str) -> Result<bool>;

    /// Delete all expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> Result<i64>;
}

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Request for creating a note. Text metrics are derived on insert;
/// sentiment is supplied because it comes from the generation service.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub body: String,
    pub content_type: String,
    pub note_type: String,
    pub emoji: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub is_template: bool,
    pub parent_note_id: Option<Uuid>,
    pub sentiment: Sentiment,
}

/// Request for updating a note. Only set fields change; metrics are
/// re-derived whenever `body` is set.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub note_type: Option<String>,
    pub emoji: Option<String>,
    /// Outer None leaves the category alone; inner None clears it.
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_public: Option<bool>,
    /// Present when the body changed and sentiment was re-derived.
    pub sentiment: Option<Sentiment>,
}

impl UpdateNoteRequest {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.note_type.is_none()
            && self.emoji.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
            && self.is_archived.is_none()
            && self.is_public.is_none()
    }
}

/// Request for listing notes. Archived notes are always excluded.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    /// 1-based page, defaults to 1.
    pub page: Option<i64>,
    /// Page size, defaults to 20; the HTTP layer caps it at 100.
    pub per_page: Option<i64>,
    /// Substring match against title or body.
    pub search: Option<String>,
    pub category: Option<String>,
    pub note_type: Option<String>,
    pub favorite: Option<bool>,
}

/// One page of notes plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note.
    async fn insert(&self, account_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note owned by the account.
    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Note>>;

    /// Stamp last_accessed_at with the current time.
    async fn touch_access(&self, id: Uuid) -> Result<()>;

    /// List non-archived notes with filtering and pagination.
    async fn list(&self, account_id: Uuid, req: ListNotesRequest) -> Result<NotePage>;

    /// Most recently updated non-archived notes.
    async fn recent(&self, account_id: Uuid, limit: i64) -> Result<Vec<Note>>;

    /// Apply a partial update and return the fresh note.
    async fn update(&self, account_id: Uuid, id: Uuid, req: UpdateNoteRequest)
        -> Result<Option<Note>>;

    /// Permanently delete a note.
    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool>;

    /// Record the remote page id after a successful sync push.
    async fn set_remote_page(&self, id: Uuid, remote_page_id: &str) -> Result<()>;

    /// Notes the account marked as templates.
    async fn list_templates(&self, account_id: Uuid) -> Result<Vec<Note>>;

    /// Fetch one of the account's template notes.
    async fn fetch_template(&self, account_id: Uuid, id: Uuid) -> Result<Option<Note>>;
}

// =============================================================================
// TASK REPOSITORY TRAITS
// =============================================================================

/// Request for creating a task.
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub project: Option<String>,
    pub parent_task_id: Option<Uuid>,
}

/// Request for updating a task. Only set fields change. A transition
/// into `completed` stamps completed_at and forces progress to 100;
/// completed_at is never cleared afterwards.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub progress: Option<i32>,
    /// Outer None leaves the due date alone; inner None clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Option<String>>,
    pub project: Option<Option<String>>,
}

impl UpdateTaskRequest {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.progress.is_none()
            && self.due_date.is_none()
            && self.start_date.is_none()
            && self.estimated_hours.is_none()
            && self.actual_hours.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.project.is_none()
    }
}

/// Request for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct ListTasksRequest {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project: Option<String>,
}

/// Repository for task CRUD operations.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task.
    async fn insert(&self, account_id: Uuid, req: CreateTaskRequest) -> Result<Task>;

    /// Fetch a task owned by the account.
    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Task>>;

    /// List tasks, urgent first, then by due date.
    async fn list(&self, account_id: Uuid, req: ListTasksRequest) -> Result<Vec<Task>>;

    /// Apply a partial update and return the fresh task.
    async fn update(&self, account_id: Uuid, id: Uuid, req: UpdateTaskRequest)
        -> Result<Option<Task>>;

    /// Permanently delete a task.
    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool>;

    /// Titles of the most recently updated tasks, for chat context.
    async fn recent_titles(&self, account_id: Uuid, limit: i64) -> Result<Vec<String>>;
}

// =============================================================================
// EVENT REPOSITORY TRAITS
// =============================================================================

/// Request for creating an event.
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub is_all_day: bool,
    pub event_type: String,
    pub status: String,
    pub location: Option<String>,
    pub is_online: bool,
    pub meeting_url: Option<String>,
    pub attendees: Vec<String>,
    pub recurrence_rule: Option<String>,
    pub color: String,
    pub category: Option<String>,
}

/// Request for updating an event. Only set fields change.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub is_all_day: Option<bool>,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub location: Option<Option<String>>,
    pub is_online: Option<bool>,
    pub meeting_url: Option<Option<String>>,
    pub attendees: Option<Vec<String>>,
    pub recurrence_rule: Option<Option<String>>,
    pub color: Option<String>,
    pub category: Option<Option<String>>,
}

impl UpdateEventRequest {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.timezone.is_none()
            && self.is_all_day.is_none()
            && self.event_type.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.is_online.is_none()
            && self.meeting_url.is_none()
            && self.attendees.is_none()
            && self.recurrence_rule.is_none()
            && self.color.is_none()
            && self.category.is_none()
    }
}

/// Request for listing events inside an optional time range.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListEventsRequest {
    /// Keep events starting at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Keep events starting before this instant.
    pub end: Option<DateTime<Utc>>,
}

/// Repository for calendar events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event.
    async fn insert(&self, account_id: Uuid, req: CreateEventRequest) -> Result<Event>;

    /// Fetch an event owned by the account.
    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<Event>>;

    /// List events in chronological order.
    async fn list(&self, account_id: Uuid, req: ListEventsRequest) -> Result<Vec<Event>>;

    /// Apply a partial update and return the fresh event.
    async fn update(&self, account_id: Uuid, id: Uuid, req: UpdateEventRequest)
        -> Result<Option<Event>>;

    /// Permanently delete an event.
    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool>;
}

// =============================================================================
// INSIGHT REPOSITORY TRAITS
// =============================================================================

/// Request for recording a generated insight.
#[derive(Debug, Clone)]
pub struct CreateInsightRequest {
    pub insight_type: String,
    pub title: Option<String>,
    pub content: String,
    pub metadata: JsonValue,
    pub confidence_score: Option<f64>,
    pub is_actionable: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for insight records.
#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Insert a new insight.
    async fn insert(&self, account_id: Uuid, req: CreateInsightRequest) -> Result<Insight>;

    /// Newest insights first.
    async fn list(&self, account_id: Uuid, limit: i64) -> Result<Vec<Insight>>;

    /// Newest insight of the given type, if any.
    async fn latest(&self, account_id: Uuid, insight_type: &str) -> Result<Option<Insight>>;
}

// =============================================================================
// FOCUS SESSION REPOSITORY TRAITS
// =============================================================================

/// Request for starting a focus session. Sessions are created active
/// with started_at stamped.
#[derive(Debug, Clone)]
pub struct CreateFocusSessionRequest {
    pub task_id: Option<Uuid>,
    pub session_type: FocusSessionType,
    /// Planned length in minutes.
    pub planned_duration: i32,
    pub notes: Option<String>,
}

/// Request for completing an active focus session.
#[derive(Debug, Clone, Default)]
pub struct CompleteFocusSessionRequest {
    pub quality_rating: Option<i32>,
    pub notes: Option<String>,
    pub interruptions: Option<i32>,
    /// Defaults to 7.0 when the client does not report one.
    pub focus_score: Option<f64>,
}

/// Repository for focus sessions.
#[async_trait]
pub trait FocusSessionRepository: Send + Sync {
    /// Insert a new session in the active state.
    async fn insert(&self, account_id: Uuid, req: CreateFocusSessionRequest)
        -> Result<FocusSession>;

    /// Fetch a session owned by the account.
    async fn fetch(&self, account_id: Uuid, id: Uuid) -> Result<Option<FocusSession>>;

    /// Sessions newest first, optionally filtered by status.
    async fn list(
        &self,
        account_id: Uuid,
        status: Option<FocusSessionStatus>,
        limit: i64,
    ) -> Result<Vec<FocusSession>>;

    /// Complete an active session, deriving actual_duration from its
    /// started_at. Returns None when no active session matches.
    async fn complete(
        &self,
        account_id: Uuid,
        id: Uuid,
        req: CompleteFocusSessionRequest,
    ) -> Result<Option<FocusSession>>;
}

// =============================================================================
// SEARCH TRAITS
// =============================================================================

/// Search hits across all entity kinds.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchResults {
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
}

/// Provider for cross-entity substring search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Case-insensitive substring search over notes, tasks, and events,
    /// capped per entity kind.
    async fn search(&self, account_id: Uuid, query: &str, limit_per_kind: i64)
        -> Result<SearchResults>;
}

// =============================================================================
// ANALYTICS REPOSITORY TRAITS
// =============================================================================

/// Repository for the raw samples behind reports and coaching context.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Account-wide task counters.
    async fn task_totals(&self, account_id: Uuid) -> Result<TaskTotals>;

    /// Count of non-archived notes.
    async fn active_note_count(&self, account_id: Uuid) -> Result<i64>;

    /// Raw activity for a report window ending on `end`. Sessions are
    /// restricted to completed ones.
    async fn activity_window(&self, account_id: Uuid, end: NaiveDate, days: u32)
        -> Result<ActivityWindow>;

    /// Task-category and note-type histograms.
    async fn category_histograms(&self, account_id: Uuid) -> Result<CategoryHistograms>;

    /// Notes created at or after `since`.
    async fn notes_created_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// Tasks completed at or after `since`.
    async fn tasks_completed_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// Total and completed counts of tasks updated at or after `since`.
    async fn tasks_touched_since(&self, account_id: Uuid, since: DateTime<Utc>)
        -> Result<(i64, i64)>;

    /// Count of notes updated at or after `since`.
    async fn notes_touched_since(&self, account_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    /// Samples for every session created at or after `since`,
    /// regardless of status.
    async fn session_samples_since(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<SessionSample>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_notes_request_default() {
        let req = ListNotesRequest::default();
        assert!(req.page.is_none());
        assert!(req.per_page.is_none());
        assert!(req.search.is_none());
        assert!(req.category.is_none());
        assert!(req.note_type.is_none());
        assert!(req.favorite.is_none());
    }

    #[test]
    fn test_update_note_request_empty() {
        assert!(UpdateNoteRequest::default().is_empty());

        let req = UpdateNoteRequest {
            title: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_update_note_request_clearable_category() {
        let clear = UpdateNoteRequest {
            category: Some(None),
            ..Default::default()
        };
        assert!(!clear.is_empty());
        assert_eq!(clear.category, Some(None));

        let set = UpdateNoteRequest {
            category: Some(Some("work".to_string())),
            ..Default::default()
        };
        assert_eq!(set.category.unwrap().unwrap(), "work");
    }

    #[test]
    fn test_update_task_request_empty() {
        assert!(UpdateTaskRequest::default().is_empty());

        let req = UpdateTaskRequest {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_update_settings_request_empty() {
        assert!(UpdateSettingsRequest::default().is_empty());

        let req = UpdateSettingsRequest {
            break_duration: Some(10),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_update_event_request_empty() {
        assert!(UpdateEventRequest::default().is_empty());

        let req = UpdateEventRequest {
            meeting_url: Some(None),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_note_page_serialization() {
        let page = NotePage {
            notes: vec![],
            page: 1,
            per_page: 20,
            total: 0,
            total_pages: 0,
        };

        let json = serde_json::to_string(&page).unwrap();
        let parsed: NotePage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.per_page, 20);
        assert_eq!(parsed.total, 0);
        assert_eq!(parsed.total_pages, 0);
    }

    #[test]
    fn test_create_task_request_clone() {
        let req = CreateTaskRequest {
            title: "Ship it".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::High,
            due_date: None,
            start_date: None,
            estimated_hours: Some(2.0),
            tags: vec!["release".to_string()],
            category: None,
            project: Some("focal".to_string()),
            parent_task_id: None,
        };

        let cloned = req.clone();
        assert_eq!(cloned.title, req.title);
        assert_eq!(cloned.priority, TaskPriority::High);
        assert_eq!(cloned.estimated_hours, Some(2.0));
    }

    #[test]
    fn test_complete_focus_session_request_default() {
        let req = CompleteFocusSessionRequest::default();
        assert!(req.quality_rating.is_none());
        assert!(req.focus_score.is_none());
    }

    #[test]
    fn test_search_results_serialization() {
        let results = SearchResults {
            notes: vec![],
            tasks: vec![],
            events: vec![],
        };
        let value = serde_json::to_value(&results).unwrap();
        assert!(value["notes"].as_array().unwrap().is_empty());
        assert!(value["tasks"].as_array().unwrap().is_empty());
        assert!(value["events"].as_array().unwrap().is_empty());
    }
}
