//! Structured logging schema and field name constants for focal.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools (Loki, Elasticsearch) can query by
//! standardized field names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (rows, list items) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → handler → adapter calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "ai", "sync"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notes", "insight", "notion", "pool", "sessions"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create_note", "generate_insight", "sync_note", "login"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Account UUID the operation acts on behalf of.
pub const ACCOUNT_ID: &str = "account_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Task UUID being operated on.
pub const TASK_ID: &str = "task_id";

/// Event UUID being operated on.
pub const EVENT_ID: &str = "event_id";

/// Focus session UUID being operated on.
pub const SESSION_ID: &str = "session_id";

/// Insight UUID being operated on.
pub const INSIGHT_ID: &str = "insight_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query or listing.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt sent to the generation service.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a generation-service response.
pub const RESPONSE_LEN: &str = "response_len";

/// Window size in days for aggregation queries.
pub const WINDOW_DAYS: &str = "window_days";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── External-service fields ───────────────────────────────────────────────

/// Model name used for text generation.
pub const MODEL: &str = "model";

/// Remote service name ("generation", "notion", "github").
pub const SERVICE: &str = "service";

/// HTTP status returned by a remote service.
pub const REMOTE_STATUS: &str = "remote_status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Set when a fail-soft adapter substituted its fallback value.
pub const FALLBACK: &str = "fallback";
