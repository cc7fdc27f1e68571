//! Core data models for focal.
//!
//! These types are shared across all focal crates and represent the
//! domain entities: accounts and their owned notes, tasks, events,
//! insights, and focus sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// ACCOUNT TYPES
// =============================================================================

/// An account owning all other records.
///
/// Holds the credential hash, so the struct itself is never serialized;
/// API responses go through [`AccountView`] / [`SettingsView`].
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub theme: String,
    pub timezone: String,
    pub language: String,
    pub plan: String,
    /// Working hours as "HH:MM" wall-clock strings, uninterpreted.
    pub work_start_time: String,
    pub work_end_time: String,
    /// Preferred break length in minutes.
    pub break_duration: i32,
    /// Preferred focus session length in minutes.
    pub focus_session_duration: i32,
    pub ai_coaching_enabled: bool,
    pub ai_notifications_enabled: bool,
    pub ai_analysis_frequency: String,
    pub notion_enabled: bool,
    pub github_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of an account, safe to serialize.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub theme: String,
    pub timezone: String,
    pub language: String,
    pub plan: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub break_duration: i32,
    pub focus_session_duration: i32,
    pub ai_coaching_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            username: account.username.clone(),
            avatar_url: account.avatar_url.clone(),
            theme: account.theme.clone(),
            timezone: account.timezone.clone(),
            language: account.language.clone(),
            plan: account.plan.clone(),
            work_start_time: account.work_start_time.clone(),
            work_end_time: account.work_end_time.clone(),
            break_duration: account.break_duration,
            focus_session_duration: account.focus_session_duration,
            ai_coaching_enabled: account.ai_coaching_enabled,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}

/// Grouped settings view served by the settings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SettingsView {
    pub profile: ProfileSettings,
    pub preferences: PreferenceSettings,
    pub productivity: ProductivitySettings,
    pub ai: AiSettings,
    pub integrations: IntegrationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileSettings {
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub plan: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PreferenceSettings {
    pub theme: String,
    pub timezone: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProductivitySettings {
    pub work_start_time: String,
    pub work_end_time: String,
    pub break_duration: i32,
    pub focus_session_duration: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AiSettings {
    pub coaching_enabled: bool,
    pub notifications_enabled: bool,
    pub analysis_frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IntegrationSettings {
    pub notion_enabled: bool,
    pub github_enabled: bool,
}

impl From<&Account> for SettingsView {
    fn from(account: &Account) -> Self {
        Self {
            profile: ProfileSettings {
                username: account.username.clone(),
                email: account.email.clone(),
                avatar_url: account.avatar_url.clone(),
                plan: account.plan.clone(),
            },
            preferences: PreferenceSettings {
                theme: account.theme.clone(),
                timezone: account.timezone.clone(),
                language: account.language.clone(),
            },
            productivity: ProductivitySettings {
                work_start_time: account.work_start_time.clone(),
                work_end_time: account.work_end_time.clone(),
                break_duration: account.break_duration,
                focus_session_duration: account.focus_session_duration,
            },
            ai: AiSettings {
                coaching_enabled: account.ai_coaching_enabled,
                notifications_enabled: account.ai_notifications_enabled,
                analysis_frequency: account.ai_analysis_frequency.clone(),
            },
            integrations: IntegrationSettings {
                notion_enabled: account.notion_enabled,
                github_enabled: account.github_enabled,
            },
        }
    }
}

/// Bearer session backing an issued access token.
///
/// Only the SHA-256 digest of the token is kept; the raw token exists
/// solely in the response that issued it.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Sentiment classification of a piece of text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Invalid sentiment label: {}", s)),
        }
    }
}

/// Sentiment score and label pair as produced by the sentiment adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Sentiment {
    /// Score in [-1.0, 1.0]; 0.0 is neutral.
    pub score: f64,
    pub label: SentimentLabel,
}

/// A note with derived metrics and sentiment.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub body: String,
    pub content_type: String,
    pub note_type: String,
    pub emoji: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Derived from the body on every write; see `BodyMetrics`.
    pub character_count: i32,
    pub word_count: i32,
    pub reading_time: i32,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub is_public: bool,
    pub is_template: bool,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// Page id on the note-sync service, set after a successful push.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_note_id: Option<Uuid>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// TASK TYPES
// =============================================================================

/// Task workflow status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Review => write!(f, "review"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid task priority: {}", s)),
        }
    }
}

/// A task with completion tracking.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Percent complete in [0, 100]; forced to 100 on completion.
    pub progress: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<Uuid>,
    /// Stamped on the first transition into `completed`; never cleared.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// EVENT TYPES
// =============================================================================

/// A calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    /// Expected to be >= start_time, but not enforced.
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub is_all_day: bool,
    pub event_type: String,
    pub status: String,
    pub location: Option<String>,
    pub is_online: bool,
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Free-text recurrence rule, unvalidated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    pub color: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// INSIGHT TYPES
// =============================================================================

/// A generated insight record. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Insight {
    pub id: Uuid,
    pub account_id: Uuid,
    /// e.g. "daily_summary"
    pub insight_type: String,
    pub title: Option<String>,
    /// Serialized payload as returned by (or substituted for) the
    /// generation service.
    pub content: String,
    /// Input statistics the payload was generated from.
    pub metadata: JsonValue,
    pub confidence_score: Option<f64>,
    pub is_read: bool,
    pub is_actionable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// FOCUS SESSION TYPES
// =============================================================================

/// Kind of focus session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FocusSessionType {
    #[default]
    Pomodoro,
    DeepWork,
    Break,
}

impl std::fmt::Display for FocusSessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pomodoro => write!(f, "pomodoro"),
            Self::DeepWork => write!(f, "deep_work"),
            Self::Break => write!(f, "break"),
        }
    }
}

impl std::str::FromStr for FocusSessionType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pomodoro" => Ok(Self::Pomodoro),
            "deep_work" => Ok(Self::DeepWork),
            "break" => Ok(Self::Break),
            _ => Err(format!("Invalid focus session type: {}", s)),
        }
    }
}

/// Focus session lifecycle status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FocusSessionStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for FocusSessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for FocusSessionStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid focus session status: {}", s)),
        }
    }
}

/// A timed focus session, optionally linked to a task.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FocusSession {
    pub id: Uuid,
    pub account_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    pub session_type: FocusSessionType,
    /// Planned length in minutes.
    pub planned_duration: i32,
    /// Whole minutes elapsed between start and completion; set once.
    pub actual_duration: Option<i32>,
    pub status: FocusSessionStatus,
    /// Self-reported rating in [1, 5].
    pub quality_rating: Option<i32>,
    pub notes: Option<String>,
    pub interruptions: i32,
    /// Focus score in [0, 10].
    pub focus_score: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// DASHBOARD TYPES
// =============================================================================

/// Headline counters for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub total_notes: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    /// completed / max(1, total) * 100
    pub completion_rate: f64,
    pub weekly_notes: i64,
    pub weekly_completed_tasks: i64,
}

/// Aggregate dashboard response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub today_events: Vec<Event>,
    pub recent_notes: Vec<Note>,
    pub latest_insight: Option<Insight>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_note() -> Note {
        Note {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            title: "Test".to_string(),
            body: "hello world".to_string(),
            content_type: "markdown".to_string(),
            note_type: "note".to_string(),
            emoji: "📝".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            category: None,
            character_count: 11,
            word_count: 2,
            reading_time: 1,
            is_favorite: false,
            is_archived: false,
            is_public: false,
            is_template: false,
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            remote_page_id: None,
            parent_note_id: None,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_note_serialization_round_trip() {
        let note = sample_note();
        let serialized = serde_json::to_string(&note).unwrap();
        let deserialized: Note = serde_json::from_str(&serialized).unwrap();
        assert_eq!(note.id, deserialized.id);
        assert_eq!(deserialized.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_note_skips_remote_page_id_when_none() {
        let note = sample_note();
        let value = serde_json::to_value(&note).unwrap();
        assert!(!value.as_object().unwrap().contains_key("remote_page_id"));
    }

    #[test]
    fn test_note_tags_default_to_empty() {
        let mut value = serde_json::to_value(sample_note()).unwrap();
        value.as_object_mut().unwrap().remove("tags");
        let note: Note = serde_json::from_value(value).unwrap();
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_task_status_serialization() {
        let cases = vec![
            (TaskStatus::Todo, "todo"),
            (TaskStatus::InProgress, "in_progress"),
            (TaskStatus::Review, "review"),
            (TaskStatus::Completed, "completed"),
            (TaskStatus::Cancelled, "cancelled"),
        ];

        for (status, expected) in cases {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", expected));
            let deserialized: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, status);
            assert_eq!(status.to_string(), expected);
            assert_eq!(expected.parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_task_priority_serialization() {
        let cases = vec![
            (TaskPriority::Low, "low"),
            (TaskPriority::Medium, "medium"),
            (TaskPriority::High, "high"),
            (TaskPriority::Urgent, "urgent"),
        ];

        for (priority, expected) in cases {
            let json = serde_json::to_string(&priority).unwrap();
            assert_eq!(json, format!("\"{}\"", expected));
            assert_eq!(expected.parse::<TaskPriority>().unwrap(), priority);
        }
    }

    #[test]
    fn test_task_status_invalid_parse() {
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_focus_session_type_serialization() {
        let json = serde_json::to_string(&FocusSessionType::DeepWork).unwrap();
        assert_eq!(json, "\"deep_work\"");
        assert_eq!(
            "deep_work".parse::<FocusSessionType>().unwrap(),
            FocusSessionType::DeepWork
        );
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(FocusSessionType::default(), FocusSessionType::Pomodoro);
        assert_eq!(FocusSessionStatus::default(), FocusSessionStatus::Planned);
        assert_eq!(SentimentLabel::default(), SentimentLabel::Neutral);
    }

    #[test]
    fn test_sentiment_label_case_insensitive_parse() {
        assert_eq!(
            "POSITIVE".parse::<SentimentLabel>().unwrap(),
            SentimentLabel::Positive
        );
    }

    fn sample_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            avatar_url: None,
            theme: "light".to_string(),
            timezone: "UTC".to_string(),
            language: "en".to_string(),
            plan: "free".to_string(),
            work_start_time: "09:00".to_string(),
            work_end_time: "18:00".to_string(),
            break_duration: 15,
            focus_session_duration: 25,
            ai_coaching_enabled: true,
            ai_notifications_enabled: true,
            ai_analysis_frequency: "daily".to_string(),
            notion_enabled: false,
            github_enabled: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_account_view_omits_credential() {
        let account = sample_account();
        let view = AccountView::from(&account);
        let value = serde_json::to_value(&view).unwrap();
        assert!(!value.as_object().unwrap().contains_key("password_hash"));
        assert_eq!(value["email"], json!("ada@example.com"));
    }

    #[test]
    fn test_settings_view_groups_fields() {
        let account = sample_account();
        let view = SettingsView::from(&account);
        assert_eq!(view.profile.username, "ada");
        assert_eq!(view.preferences.theme, "light");
        assert_eq!(view.productivity.break_duration, 15);
        assert!(view.ai.coaching_enabled);
        assert!(!view.integrations.notion_enabled);
    }

    #[test]
    fn test_insight_metadata_round_trip() {
        let insight = Insight {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            insight_type: "daily_summary".to_string(),
            title: Some("report".to_string()),
            content: "{}".to_string(),
            metadata: json!({"completion_rate": 60.0}),
            confidence_score: Some(0.85),
            is_read: false,
            is_actionable: false,
            expires_at: None,
            created_at: Utc::now(),
        };

        let serialized = serde_json::to_string(&insight).unwrap();
        let deserialized: Insight = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.metadata["completion_rate"], json!(60.0));
    }
}
