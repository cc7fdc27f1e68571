//! focal-api - HTTP API server for focal

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Deserialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use uuid::Uuid;

use focal_ai::{
    analyze_sentiment, coach_chat, daily_insight, estimate_task_hours, insight_record,
    GenerationClient, DAILY_SUMMARY_TYPE,
};
use focal_core::{
    builtin_template, completion_rate, daily_buckets, session_rollup, summarize, week_stats,
    Account, AccountRepository, AccountView, AnalyticsReport, AnalyticsRepository, CategoryCount,
    CategoryHistograms, CoachingWindow, CompleteFocusSessionRequest, CreateAccountRequest,
    CreateEventRequest, CreateFocusSessionRequest, CreateNoteRequest, CreateTaskRequest,
    DailyBucket, Event, EventRepository, FocusSession, FocusSessionRepository, FocusSessionStatus,
    FocusSessionType, Insight, InsightRepository, ListEventsRequest, ListNotesRequest,
    ListTasksRequest, Note, NotePage, NoteRepository, SearchProvider, SearchResults, Sentiment,
    SentimentLabel, SessionRepository, SettingsView, Task, TaskPriority, TaskRepository,
    TaskStatus, UpdateEventRequest, UpdateNoteRequest, UpdateSettingsRequest, UpdateTaskRequest,
    WindowSummary, BUILTIN_TEMPLATES, COACHING_WINDOW_DAYS, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS,
};
use focal_db::{generate_access_token, hash_password, token_digest, verify_password, Database};
use focal_sync::{GithubClient, NotionClient};

/// Most recently updated notes shown on the dashboard.
const RECENT_NOTE_LIMIT: i64 = 5;

/// Per-kind result cap for cross-entity search.
const SEARCH_LIMIT_PER_KIND: i64 = 10;

/// Focus sessions returned by the list endpoint.
const FOCUS_SESSION_LIMIT: i64 = 50;

/// Default insight history page size.
const INSIGHT_HISTORY_LIMIT: i64 = 10;

/// Recent task titles handed to the chat assistant as context.
const CHAT_CONTEXT_TASKS: i64 = 5;

/// Remote repositories returned by the issue-tracker listing.
const REPO_LIST_CAP: usize = 20;

/// Upper bound for the notes `per_page` parameter.
const MAX_PER_PAGE: i64 = 100;

/// Request body limit. Note bodies top out well under this.
const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically in logs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    generation: Arc<GenerationClient>,
    notion: Arc<NotionClient>,
    github: Arc<GithubClient>,
    /// Days until a newly issued session token expires.
    session_ttl_days: i64,
}

// =============================================================================
// OPENAPI DOCUMENT
// =============================================================================

/// Machine-readable schema catalog served at `/api/v1/openapi.json`.
#[allow(dead_code)]
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Focal API",
        description = "Personal productivity backend: notes, tasks, events, focus sessions, and AI coaching"
    ),
    components(schemas(
        AccountView,
        SettingsView,
        Note,
        NotePage,
        Task,
        Event,
        Insight,
        FocusSession,
        Sentiment,
        SentimentLabel,
        TaskStatus,
        TaskPriority,
        FocusSessionType,
        FocusSessionStatus,
        SearchResults,
        AnalyticsReport,
        DailyBucket,
        WindowSummary,
        CategoryHistograms,
        CategoryCount
    )),
    tags(
        (name = "Auth", description = "Registration, login, and session identity"),
        (name = "Notes", description = "Note CRUD, templates, and remote sync"),
        (name = "Tasks", description = "Task CRUD and completion transitions"),
        (name = "Events", description = "Calendar events"),
        (name = "Focus", description = "Focus session lifecycle"),
        (name = "Insights", description = "AI coaching insights and chat"),
        (name = "Analytics", description = "Productivity reports and search"),
        (name = "System", description = "Health and service availability")
    )
)]
struct ApiDoc;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "pretty" (default: "pretty")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "focal_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "focal_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("focal-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/focal".to_string());
    let bind_addr =
        std::env::var("FOCAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8420".to_string());
    let session_ttl_days: i64 = std::env::var("SESSION_TTL_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(7);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // External service clients; absent credentials construct as disabled
    let generation = Arc::new(GenerationClient::from_env()?);
    let notion = Arc::new(NotionClient::from_env()?);
    let github = Arc::new(GithubClient::from_env()?);
    info!(
        generation = generation.is_configured(),
        note_sync = notion.is_configured(),
        issue_tracker = github.is_configured(),
        "External integrations initialized"
    );

    let state = AppState {
        db,
        generation,
        notion,
        github,
        session_ttl_days,
    };

    // Build router
    let app = Router::new()
        // Health check and schema catalog
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/openapi.json", get(openapi_json))
        // Auth
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(current_account))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard))
        // Notes CRUD
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route(
            "/api/v1/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        // Templates
        .route("/api/v1/templates", get(list_templates))
        .route("/api/v1/templates/:id/use", post(use_template))
        // Tasks CRUD
        .route("/api/v1/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/v1/tasks/:id",
            axum::routing::put(update_task).delete(delete_task),
        )
        // Events CRUD
        .route("/api/v1/events", get(list_events).post(create_event))
        .route(
            "/api/v1/events/:id",
            axum::routing::put(update_event).delete(delete_event),
        )
        // Focus sessions
        .route(
            "/api/v1/focus/sessions",
            get(list_focus_sessions).post(start_focus_session),
        )
        .route(
            "/api/v1/focus/sessions/:id/complete",
            post(complete_focus_session),
        )
        // Coaching insights and chat
        .route("/api/v1/insights", get(list_insights))
        .route("/api/v1/insights/generate", post(generate_insight))
        .route("/api/v1/ai/chat", post(ai_chat))
        // Search and analytics
        .route("/api/v1/search", get(search))
        .route("/api/v1/analytics/productivity", get(productivity_analytics))
        // Settings
        .route(
            "/api/v1/settings",
            get(get_settings).put(update_settings),
        )
        // External integrations
        .route("/api/v1/sync/notes/:id", post(sync_note))
        .route("/api/v1/integrations/issues/repos", get(list_issue_repos))
        .route("/api/v1/integrations/issues", post(create_issue))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // Start server
    let addr: SocketAddr = bind_addr.parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// CORS
// =============================================================================

/// Parse a comma-separated origin list, dropping entries that are not
/// valid header values.
fn parse_cors_origins(value: &str) -> Vec<HeaderValue> {
    value
        .split(',')
        .filter_map(|origin| {
            let origin = origin.trim();
            if origin.is_empty() {
                return None;
            }
            match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            }
        })
        .collect()
}

/// CORS layer from `CORS_ORIGINS`. The default `*` allows any origin
/// without credentials; an explicit origin list enables credentials.
fn cors_layer() -> CorsLayer {
    let configured = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    if configured.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(parse_cors_origins(&configured)))
            .allow_credentials(true)
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

/// Deserialize a nullable field so that absent and explicit-null are
/// distinguishable: absent stays `None`, `null` becomes `Some(None)`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Extractor resolving the bearer token to its account.
///
/// Handlers take this as an argument; endpoints without it are public.
#[derive(Debug, Clone)]
struct Auth {
    account: Account,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let account = state
            .db
            .sessions
            .resolve(&token_digest(token))
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Auth { account })
    }
}

/// Issue a fresh session token for an account and return the raw token.
/// Only the digest hits the database.
async fn issue_session(state: &AppState, account_id: Uuid) -> Result<String, ApiError> {
    let token = generate_access_token();
    let expires_at = Utc::now() + Duration::days(state.session_ttl_days);
    state
        .db
        .sessions
        .insert(account_id, &token_digest(&token), expires_at)
        .await?;
    Ok(token)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = sqlx::query("SELECT 1")
        .execute(state.db.pool())
        .await
        .is_ok();
    let status = if database_up { "healthy" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "services": {
            "database": database_up,
            "generation": state.generation.is_configured(),
            "note_sync": state.notion.is_configured(),
            "issue_tracker": state.github.is_configured(),
        },
    }))
}

// =============================================================================
// AUTH HANDLERS
// =============================================================================

/// Default avatar for accounts registered without one.
fn default_avatar_url(username: &str) -> String {
    format!("https://ui-avatars.com/api/?name={username}&background=6366f1&color=fff")
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.unwrap_or_default().trim().to_string();
    let username = body.username.unwrap_or_default().trim().to_string();
    let password = body.password.unwrap_or_default();

    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email, username, and password are required".to_string(),
        ));
    }

    if state.db.accounts.fetch_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let account = state
        .db
        .accounts
        .insert(CreateAccountRequest {
            email,
            password_hash: hash_password(&password)?,
            avatar_url: Some(default_avatar_url(&username)),
            username,
        })
        .await?;

    let token = issue_session(&state, account.id).await?;
    info!(account_id = %account.id, "Account registered");

    Ok(Json(serde_json::json!({
        "token": token,
        "account": AccountView::from(&account),
    })))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    // One message for both unknown email and bad password
    let account = state
        .db
        .accounts
        .fetch_by_email(email.trim())
        .await?
        .filter(|account| verify_password(&password, &account.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    state.db.accounts.record_login(account.id).await?;
    let token = issue_session(&state, account.id).await?;

    Ok(Json(serde_json::json!({
        "token": token,
        "account": AccountView::from(&account),
    })))
}

async fn current_account(auth: Auth) -> impl IntoResponse {
    Json(AccountView::from(&auth.account))
}

// =============================================================================
// DASHBOARD
// =============================================================================

async fn dashboard(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    let account_id = auth.account.id;

    let totals = state.db.analytics.task_totals(account_id).await?;
    let total_notes = state.db.analytics.active_note_count(account_id).await?;

    let week_ago = Utc::now() - Duration::days(7);
    let weekly_notes = state
        .db
        .analytics
        .notes_created_since(account_id, week_ago)
        .await?;
    let weekly_completed_tasks = state
        .db
        .analytics
        .tasks_completed_since(account_id, week_ago)
        .await?;

    let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let today_events = state
        .db
        .events
        .list(
            account_id,
            ListEventsRequest {
                start: Some(today_start),
                end: Some(today_start + Duration::days(1)),
            },
        )
        .await?;

    let recent_notes = state.db.notes.recent(account_id, RECENT_NOTE_LIMIT).await?;
    let latest_insight = state
        .db
        .insights
        .latest(account_id, DAILY_SUMMARY_TYPE)
        .await?;

    Ok(Json(serde_json::json!({
        "stats": {
            "total_notes": total_notes,
            "total_tasks": totals.total,
            "completed_tasks": totals.completed,
            "in_progress_tasks": totals.in_progress,
            "completion_rate": completion_rate(totals.completed, totals.total),
            "weekly_notes": weekly_notes,
            "weekly_completed_tasks": weekly_completed_tasks,
        },
        "today_events": today_events,
        "recent_notes": recent_notes,
        "ai_insight": latest_insight,
    })))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    page: Option<i64>,
    per_page: Option<i64>,
    search: Option<String>,
    category: Option<String>,
    note_type: Option<String>,
    favorite: Option<bool>,
}

async fn list_notes(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = ListNotesRequest {
        page: query.page,
        per_page: query.per_page.map(|p| p.min(MAX_PER_PAGE)),
        search: query.search,
        category: query.category,
        note_type: query.note_type,
        favorite: query.favorite,
    };

    let page = state.db.notes.list(auth.account.id, req).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
struct CreateNoteBody {
    title: Option<String>,
    body: Option<String>,
    content_type: Option<String>,
    note_type: Option<String>,
    emoji: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<String>,
    is_template: Option<bool>,
    parent_note_id: Option<Uuid>,
    /// Push the new note to the note-sync service after creation.
    #[serde(default)]
    sync_remote: bool,
}

async fn create_note(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body.title.unwrap_or_default();
    let text = body.body.unwrap_or_default();
    if title.trim().is_empty() || text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Title and body are required".to_string(),
        ));
    }

    let outcome = analyze_sentiment(&state.generation, &text).await;
    if let Some(err) = outcome.error() {
        warn!(account_id = %auth.account.id, "Sentiment scoring degraded: {}", err);
    }

    let req = CreateNoteRequest {
        title,
        body: text,
        content_type: body.content_type.unwrap_or_else(|| "markdown".to_string()),
        note_type: body.note_type.unwrap_or_else(|| "note".to_string()),
        emoji: body.emoji.unwrap_or_else(|| "📝".to_string()),
        tags: body.tags.unwrap_or_default(),
        category: body.category,
        is_template: body.is_template.unwrap_or(false),
        parent_note_id: body.parent_note_id,
        sentiment: outcome.into_value(),
    };

    let mut note = state.db.notes.insert(auth.account.id, req).await?;

    // Optional push to the note-sync service; failure never blocks creation
    if body.sync_remote && state.notion.is_configured() {
        match state.notion.sync_note(&note).await {
            Ok(page_id) => {
                state.db.notes.set_remote_page(note.id, &page_id).await?;
                note.remote_page_id = Some(page_id);
            }
            Err(e) => warn!(note_id = %note.id, "Remote sync failed: {}", e),
        }
    }

    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .notes
        .fetch(auth.account.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    state.db.notes.touch_access(note.id).await?;
    Ok(Json(note))
}

#[derive(Debug, Deserialize)]
struct UpdateNoteBody {
    title: Option<String>,
    body: Option<String>,
    note_type: Option<String>,
    emoji: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    category: Option<Option<String>>,
    tags: Option<Vec<String>>,
    is_favorite: Option<bool>,
    is_archived: Option<bool>,
    is_public: Option<bool>,
}

async fn update_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut req = UpdateNoteRequest {
        title: body.title,
        body: body.body,
        note_type: body.note_type,
        emoji: body.emoji,
        category: body.category,
        tags: body.tags,
        is_favorite: body.is_favorite,
        is_archived: body.is_archived,
        is_public: body.is_public,
        sentiment: None,
    };

    // A changed body gets fresh sentiment alongside the re-derived metrics
    if let Some(text) = req.body.as_deref() {
        let outcome = analyze_sentiment(&state.generation, text).await;
        if let Some(err) = outcome.error() {
            warn!(note_id = %id, "Sentiment scoring degraded: {}", err);
        }
        req.sentiment = Some(outcome.into_value());
    }

    let note = state
        .db
        .notes
        .update(auth.account.id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.notes.delete(auth.account.id, id).await? {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// TEMPLATE HANDLERS
// =============================================================================

async fn list_templates(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user_templates = state.db.notes.list_templates(auth.account.id).await?;

    Ok(Json(serde_json::json!({
        "default_templates": BUILTIN_TEMPLATES,
        "user_templates": user_templates,
    })))
}

#[derive(Debug, Default, Deserialize)]
struct UseTemplateBody {
    title: Option<String>,
}

async fn use_template(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<String>,
    body: Option<Json<UseTemplateBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    // Built-in ids are fixed strings; anything else must be one of the
    // account's template notes.
    let (title, text, emoji, note_type) = if let Some(t) = builtin_template(&id) {
        (
            t.title.to_string(),
            t.body.to_string(),
            t.emoji.to_string(),
            t.category.to_string(),
        )
    } else if let Some(note) = match id.parse::<Uuid>() {
        Ok(note_id) => state.db.notes.fetch_template(auth.account.id, note_id).await?,
        Err(_) => None,
    } {
        (note.title, note.body, note.emoji, note.note_type)
    } else {
        return Err(ApiError::NotFound("Template not found".to_string()));
    };

    let req = CreateNoteRequest {
        title: body.title.filter(|t| !t.trim().is_empty()).unwrap_or(title),
        body: text,
        content_type: "markdown".to_string(),
        note_type,
        emoji,
        tags: Vec::new(),
        category: None,
        is_template: false,
        parent_note_id: None,
        sentiment: Sentiment::default(),
    };

    let note = state.db.notes.insert(auth.account.id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

// =============================================================================
// TASK HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    status: Option<String>,
    priority: Option<String>,
    project: Option<String>,
}

async fn list_tasks(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = ListTasksRequest {
        status: query
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        priority: query
            .priority
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        project: query.project,
    };

    let tasks = state.db.tasks.list(auth.account.id, req).await?;
    Ok(Json(tasks))
}

#[derive(Debug, Deserialize)]
struct CreateTaskBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    estimated_hours: Option<f64>,
    tags: Option<Vec<String>>,
    category: Option<String>,
    project: Option<String>,
    parent_task_id: Option<Uuid>,
}

async fn create_task(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateTaskBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let description = body.description.unwrap_or_default();

    // The estimation adapter seeds estimated_hours unless the client
    // supplied one.
    let estimated_hours = match body.estimated_hours {
        Some(hours) => hours,
        None => {
            let outcome = estimate_task_hours(&state.generation, &title, &description).await;
            if let Some(err) = outcome.error() {
                warn!(account_id = %auth.account.id, "Task estimation degraded: {}", err);
            }
            outcome.into_value()
        }
    };

    let req = CreateTaskRequest {
        title,
        description,
        status: body
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?
            .unwrap_or_default(),
        priority: body
            .priority
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?
            .unwrap_or_default(),
        due_date: body.due_date,
        start_date: body.start_date,
        estimated_hours: Some(estimated_hours),
        tags: body.tags.unwrap_or_default(),
        category: body.category,
        project: body.project,
        parent_task_id: body.parent_task_id,
    };

    let task = state.db.tasks.insert(auth.account.id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize)]
struct UpdateTaskBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    progress: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    start_date: Option<Option<DateTime<Utc>>>,
    estimated_hours: Option<f64>,
    actual_hours: Option<f64>,
    tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    project: Option<Option<String>>,
}

async fn update_task(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(progress) = body.progress {
        if !(0..=100).contains(&progress) {
            return Err(ApiError::BadRequest(
                "progress must be between 0 and 100".to_string(),
            ));
        }
    }

    let req = UpdateTaskRequest {
        title: body.title,
        description: body.description,
        status: body
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        priority: body
            .priority
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        progress: body.progress,
        due_date: body.due_date,
        start_date: body.start_date,
        estimated_hours: body.estimated_hours,
        actual_hours: body.actual_hours,
        tags: body.tags,
        category: body.category,
        project: body.project,
    };

    let task = state
        .db
        .tasks
        .update(auth.account.id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.tasks.delete(auth.account.id, id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// EVENT HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListEventsQuery {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

async fn list_events(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .db
        .events
        .list(
            auth.account.id,
            ListEventsRequest {
                start: query.start,
                end: query.end,
            },
        )
        .await?;

    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
struct CreateEventBody {
    title: Option<String>,
    description: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    timezone: Option<String>,
    is_all_day: Option<bool>,
    event_type: Option<String>,
    status: Option<String>,
    location: Option<String>,
    is_online: Option<bool>,
    meeting_url: Option<String>,
    attendees: Option<Vec<String>>,
    recurrence_rule: Option<String>,
    color: Option<String>,
    category: Option<String>,
}

async fn create_event(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateEventBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body.title.unwrap_or_default();
    let (start_time, end_time) = match (body.start_time, body.end_time) {
        (Some(start), Some(end)) if !title.trim().is_empty() => (start, end),
        _ => {
            return Err(ApiError::BadRequest(
                "Title, start_time, and end_time are required".to_string(),
            ))
        }
    };

    let req = CreateEventRequest {
        title,
        description: body.description.unwrap_or_default(),
        start_time,
        end_time,
        timezone: body.timezone.unwrap_or_else(|| "UTC".to_string()),
        is_all_day: body.is_all_day.unwrap_or(false),
        event_type: body.event_type.unwrap_or_else(|| "meeting".to_string()),
        status: body.status.unwrap_or_else(|| "confirmed".to_string()),
        location: body.location,
        is_online: body.is_online.unwrap_or(false),
        meeting_url: body.meeting_url,
        attendees: body.attendees.unwrap_or_default(),
        recurrence_rule: body.recurrence_rule,
        color: body.color.unwrap_or_else(|| "#3B82F6".to_string()),
        category: body.category,
    };

    let event = state.db.events.insert(auth.account.id, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
struct UpdateEventBody {
    title: Option<String>,
    description: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    timezone: Option<String>,
    is_all_day: Option<bool>,
    event_type: Option<String>,
    status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    location: Option<Option<String>>,
    is_online: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    meeting_url: Option<Option<String>>,
    attendees: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    recurrence_rule: Option<Option<String>>,
    color: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    category: Option<Option<String>>,
}

async fn update_event(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEventBody>,
) -> Result<impl IntoResponse, ApiError> {
    let req = UpdateEventRequest {
        title: body.title,
        description: body.description,
        start_time: body.start_time,
        end_time: body.end_time,
        timezone: body.timezone,
        is_all_day: body.is_all_day,
        event_type: body.event_type,
        status: body.status,
        location: body.location,
        is_online: body.is_online,
        meeting_url: body.meeting_url,
        attendees: body.attendees,
        recurrence_rule: body.recurrence_rule,
        color: body.color,
        category: body.category,
    };

    let event = state
        .db
        .events
        .update(auth.account.id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.events.delete(auth.account.id, id).await? {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// FOCUS SESSION HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct FocusQuery {
    status: Option<String>,
}

async fn list_focus_sessions(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<FocusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status: Option<FocusSessionStatus> = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let sessions = state
        .db
        .focus_sessions
        .list(auth.account.id, status, FOCUS_SESSION_LIMIT)
        .await?;

    Ok(Json(sessions))
}

#[derive(Debug, Deserialize)]
struct CreateFocusBody {
    task_id: Option<Uuid>,
    session_type: Option<String>,
    planned_duration: Option<i32>,
    notes: Option<String>,
}

async fn start_focus_session(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateFocusBody>,
) -> Result<impl IntoResponse, ApiError> {
    let session_type: FocusSessionType = body
        .session_type
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("session_type is required".to_string()))?
        .parse()
        .map_err(ApiError::BadRequest)?;
    let planned_duration = body
        .planned_duration
        .ok_or_else(|| ApiError::BadRequest("planned_duration is required".to_string()))?;

    let req = CreateFocusSessionRequest {
        task_id: body.task_id,
        session_type,
        planned_duration,
        notes: body.notes,
    };

    let session = state.db.focus_sessions.insert(auth.account.id, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Debug, Default, Deserialize)]
struct CompleteFocusBody {
    quality_rating: Option<i32>,
    notes: Option<String>,
    interruptions: Option<i32>,
    focus_score: Option<f64>,
}

async fn complete_focus_session(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteFocusBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let req = CompleteFocusSessionRequest {
        quality_rating: body.quality_rating,
        notes: body.notes,
        interruptions: body.interruptions,
        focus_score: body.focus_score,
    };

    let session = state
        .db
        .focus_sessions
        .complete(auth.account.id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("No active session to complete".to_string()))?;

    Ok(Json(session))
}

// =============================================================================
// INSIGHT & CHAT HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct InsightsQuery {
    limit: Option<i64>,
}

async fn list_insights(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<InsightsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(INSIGHT_HISTORY_LIMIT).max(1);
    let insights = state.db.insights.list(auth.account.id, limit).await?;
    Ok(Json(insights))
}

async fn generate_insight(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.account.ai_coaching_enabled {
        return Ok(Json(serde_json::json!({
            "insight": null,
            "fallback": false,
        })));
    }

    let account_id = auth.account.id;
    let since = Utc::now() - Duration::days(i64::from(COACHING_WINDOW_DAYS));

    let (tasks_total, tasks_completed) = state
        .db
        .analytics
        .tasks_touched_since(account_id, since)
        .await?;
    let notes_touched = state
        .db
        .analytics
        .notes_touched_since(account_id, since)
        .await?;
    let samples = state
        .db
        .analytics
        .session_samples_since(account_id, since)
        .await?;
    let (focus_minutes, avg_focus_score) = session_rollup(&samples);

    let window = CoachingWindow {
        username: auth.account.username.clone(),
        plan: auth.account.plan.clone(),
        work_start_time: auth.account.work_start_time.clone(),
        work_end_time: auth.account.work_end_time.clone(),
        stats: week_stats(tasks_total, tasks_completed, notes_touched, focus_minutes),
        session_count: samples.len() as i64,
        avg_focus_score,
    };

    let outcome = daily_insight(&state.generation, &window).await;
    if let Some(err) = outcome.error() {
        warn!(account_id = %account_id, "Insight generation degraded: {}", err);
    }
    let fallback = !outcome.is_served();

    let record = insight_record(&window, &outcome.into_value())?;
    let insight = state.db.insights.insert(account_id, record).await?;

    Ok(Json(serde_json::json!({
        "insight": insight,
        "fallback": fallback,
    })))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: Option<String>,
}

async fn ai_chat(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<ChatBody>,
) -> Result<impl IntoResponse, ApiError> {
    let message = body.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let recent_tasks = state
        .db
        .tasks
        .recent_titles(auth.account.id, CHAT_CONTEXT_TASKS)
        .await?;

    let outcome = coach_chat(
        &state.generation,
        &auth.account.username,
        &recent_tasks,
        &message,
    )
    .await;
    if let Some(err) = outcome.error() {
        warn!(account_id = %auth.account.id, "Chat generation degraded: {}", err);
    }

    Ok(Json(serde_json::json!({
        "reply": outcome.into_value(),
        "timestamp": Utc::now(),
    })))
}

// =============================================================================
// SEARCH & ANALYTICS HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    let results = state
        .db
        .search
        .search(auth.account.id, q, SEARCH_LIMIT_PER_KIND)
        .await?;
    let total = results.notes.len() + results.tasks.len() + results.events.len();

    Ok(Json(serde_json::json!({
        "query": q,
        "results": results,
        "total_results": total,
    })))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    days: Option<u32>,
}

async fn productivity_analytics(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days > MAX_WINDOW_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be {} or less",
            MAX_WINDOW_DAYS
        )));
    }

    let account_id = auth.account.id;
    let end = Utc::now().date_naive();

    let window = state
        .db
        .analytics
        .activity_window(account_id, end, days)
        .await?;
    let buckets = daily_buckets(&window);

    let totals = state.db.analytics.task_totals(account_id).await?;
    let total_notes = state.db.analytics.active_note_count(account_id).await?;
    let categories = state.db.analytics.category_histograms(account_id).await?;

    let report = AnalyticsReport {
        summary: summarize(&totals, total_notes, &buckets),
        daily_stats: buckets,
        categories,
    };

    Ok(Json(report))
}

// =============================================================================
// SETTINGS HANDLERS
// =============================================================================

async fn get_settings(auth: Auth) -> impl IntoResponse {
    Json(SettingsView::from(&auth.account))
}

#[derive(Debug, Deserialize)]
struct UpdateSettingsBody {
    theme: Option<String>,
    timezone: Option<String>,
    language: Option<String>,
    work_start_time: Option<String>,
    work_end_time: Option<String>,
    break_duration: Option<i32>,
    focus_session_duration: Option<i32>,
    ai_coaching_enabled: Option<bool>,
    ai_notifications_enabled: Option<bool>,
    ai_analysis_frequency: Option<String>,
}

async fn update_settings(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<UpdateSettingsBody>,
) -> Result<impl IntoResponse, ApiError> {
    let req = UpdateSettingsRequest {
        theme: body.theme,
        timezone: body.timezone,
        language: body.language,
        work_start_time: body.work_start_time,
        work_end_time: body.work_end_time,
        break_duration: body.break_duration,
        focus_session_duration: body.focus_session_duration,
        ai_coaching_enabled: body.ai_coaching_enabled,
        ai_notifications_enabled: body.ai_notifications_enabled,
        ai_analysis_frequency: body.ai_analysis_frequency,
    };

    let account = state
        .db
        .accounts
        .update_settings(auth.account.id, req)
        .await?;

    Ok(Json(SettingsView::from(&account)))
}

// =============================================================================
// SYNC & INTEGRATION HANDLERS
// =============================================================================

async fn sync_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.notion.is_configured() {
        return Err(ApiError::BadRequest(
            "Note-sync integration is not configured".to_string(),
        ));
    }

    let note = state
        .db
        .notes
        .fetch(auth.account.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    let page_id = match state.notion.sync_note(&note).await {
        Ok(page_id) => page_id,
        Err(e) => {
            warn!(note_id = %note.id, "Remote sync failed: {}", e);
            return Err(ApiError::NotFound(format!("Failed to sync note: {}", e)));
        }
    };

    state.db.notes.set_remote_page(note.id, &page_id).await?;

    Ok(Json(serde_json::json!({ "remote_page_id": page_id })))
}

async fn list_issue_repos(
    State(state): State<AppState>,
    _auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    if !state.github.is_configured() {
        return Err(ApiError::BadRequest(
            "Issue-tracker integration is not configured".to_string(),
        ));
    }

    let mut repos = state.github.list_repos().await;
    repos.truncate(REPO_LIST_CAP);

    Ok(Json(repos))
}

#[derive(Debug, Deserialize)]
struct CreateIssueBody {
    repo: Option<String>,
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

async fn create_issue(
    State(state): State<AppState>,
    _auth: Auth,
    Json(body): Json<CreateIssueBody>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.github.is_configured() {
        return Err(ApiError::BadRequest(
            "Issue-tracker integration is not configured".to_string(),
        ));
    }

    let repo = body.repo.unwrap_or_default();
    let title = body.title.unwrap_or_default();
    let text = body.body.unwrap_or_default();
    if repo.trim().is_empty() || title.trim().is_empty() || text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "repo, title, and body are required".to_string(),
        ));
    }

    let issue_url = match state.github.create_issue(&repo, &title, &text, &body.labels).await {
        Ok(url) => url,
        Err(e) => {
            error!(repo = %repo, "Issue creation failed: {}", e);
            return Err(ApiError::Internal(format!(
                "Failed to create issue: {}",
                e
            )));
        }
    };

    Ok(Json(serde_json::json!({ "issue_url": issue_url })))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    /// Unexpected failure; logged in full, reported as a generic 500.
    Database(focal_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    /// Explicit 500 whose message is safe to surface.
    Internal(String),
}

impl From<focal_core::Error> for ApiError {
    fn from(err: focal_core::Error) -> Self {
        match err {
            focal_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            focal_core::Error::NoteNotFound(id) => {
                ApiError::NotFound(format!("Note not found: {}", id))
            }
            focal_core::Error::AccountNotFound(id) => {
                ApiError::NotFound(format!("Account not found: {}", id))
            }
            focal_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            // Unconfigured integrations surface as 400, per the Flask-era contract
            focal_core::Error::Config(msg) => ApiError::BadRequest(msg),
            focal_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            err => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_note_body_distinguishes_absent_and_null_category() {
        let absent: UpdateNoteBody = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.category, None);

        let cleared: UpdateNoteBody = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));

        let set: UpdateNoteBody = serde_json::from_str(r#"{"category": "work"}"#).unwrap();
        assert_eq!(set.category, Some(Some("work".to_string())));
    }

    #[test]
    fn test_update_task_body_double_options() {
        let body: UpdateTaskBody =
            serde_json::from_str(r#"{"due_date": null, "project": "focal"}"#).unwrap();
        assert_eq!(body.due_date, Some(None));
        assert_eq!(body.project, Some(Some("focal".to_string())));
        assert_eq!(body.start_date, None);
        assert_eq!(body.category, None);
    }

    #[test]
    fn test_create_note_body_sync_flag_defaults_off() {
        let body: CreateNoteBody =
            serde_json::from_str(r#"{"title": "t", "body": "b"}"#).unwrap();
        assert!(!body.sync_remote);
        assert_eq!(body.title.as_deref(), Some("t"));

        let body: CreateNoteBody =
            serde_json::from_str(r#"{"title": "t", "body": "b", "sync_remote": true}"#).unwrap();
        assert!(body.sync_remote);
    }

    #[test]
    fn test_create_issue_body_labels_default_empty() {
        let body: CreateIssueBody =
            serde_json::from_str(r#"{"repo": "a/b", "title": "t", "body": "b"}"#).unwrap();
        assert!(body.labels.is_empty());
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (
                ApiError::Unauthorized("no".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::NotFound("missing".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::BadRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Database(focal_core::Error::Internal("hidden".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert!(matches!(
            ApiError::from(focal_core::Error::NotFound("x".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(focal_core::Error::NoteNotFound(Uuid::nil())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(focal_core::Error::InvalidInput("x".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(focal_core::Error::Config("x".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(focal_core::Error::Unauthorized("x".to_string())),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(focal_core::Error::Generation("x".to_string())),
            ApiError::Database(_)
        ));
    }

    #[test]
    fn test_parse_cors_origins_filters_invalid_entries() {
        let origins =
            parse_cors_origins("https://app.example.com, , http://localhost:3000,\u{0}bad");
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://app.example.com"),
                HeaderValue::from_static("http://localhost:3000"),
            ]
        );
    }

    #[test]
    fn test_default_avatar_url_embeds_username() {
        let url = default_avatar_url("mina");
        assert!(url.contains("name=mina"));
        assert!(url.starts_with("https://ui-avatars.com/"));
    }

    #[test]
    fn test_request_id_is_uuid() {
        let mut maker = MakeRequestUuidV7;
        let request = axum::http::Request::new(());
        let id = maker.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&value).is_ok());
    }

    #[test]
    fn test_complete_focus_body_defaults_empty() {
        let body = CompleteFocusBody::default();
        assert!(body.quality_rating.is_none());
        assert!(body.focus_score.is_none());

        let parsed: CompleteFocusBody =
            serde_json::from_str(r#"{"quality_rating": 4, "focus_score": 8.5}"#).unwrap();
        assert_eq!(parsed.quality_rating, Some(4));
        assert_eq!(parsed.focus_score, Some(8.5));
    }
}
