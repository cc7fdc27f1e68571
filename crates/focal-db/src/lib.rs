//! # focal-db
//!
//! PostgreSQL storage layer for focal.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Credential hashing and opaque access token generation
//! - Cross-entity ILIKE search
//! - Read-side aggregation for the analytics engine
//!
//! ## Example
//!
//! ```rust,ignore
//! use focal_db::{Database, ListNotesRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/focal").await?;
//!
//!     let page = db.notes.list(account_id, ListNotesRequest::default()).await?;
//!     println!("{} notes", page.total);
//!     Ok(())
//! }
//! ```
pub mod accounts;
pub mod analytics;
pub mod credentials;
pub mod events;
pub mod focus_sessions;
pub mod insights;
pub mod notes;
pub mod pool;
pub mod search;
pub mod sessions;
pub mod tasks;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use focal_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use accounts::PgAccountRepository;
pub use analytics::PgAnalyticsRepository;
pub use credentials::{
    generate_access_token, hash_password, token_digest, verify_password, ACCESS_TOKEN_PREFIX,
};
pub use events::PgEventRepository;
pub use focus_sessions::PgFocusSessionRepository;
pub use insights::PgInsightRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use search::PgSearchProvider;
pub use sessions::PgSessionRepository;
pub use tasks::PgTaskRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Account repository for registration and settings.
    pub accounts: PgAccountRepository,
    /// Session repository for opaque token auth.
    pub sessions: PgSessionRepository,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
    /// Task repository for CRUD and completion transitions.
    pub tasks: PgTaskRepository,
    /// Calendar event repository.
    pub events: PgEventRepository,
    /// Coaching insight repository.
    pub insights: PgInsightRepository,
    /// Focus session repository.
    pub focus_sessions: PgFocusSessionRepository,
    /// Cross-entity substring search.
    pub search: PgSearchProvider,
    /// Read-side aggregation queries.
    pub analytics: PgAnalyticsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            accounts: PgAccountRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            tasks: PgTaskRepository::new(pool.clone()),
            events: PgEventRepository::new(pool.clone()),
            insights: PgInsightRepository::new(pool.clone()),
            focus_sessions: PgFocusSessionRepository::new(pool.clone()),
            search: PgSearchProvider::new(pool.clone()),
            analytics: PgAnalyticsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Connect to test database (for integration tests).
    #[cfg(test)]
    pub async fn connect_test() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| crate::test_fixtures::DEFAULT_TEST_DATABASE_URL.to_string());
        Self::connect(&database_url).await
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
