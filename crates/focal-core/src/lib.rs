//! # focal-core
//!
//! Core types, traits, and abstractions for Focal.
//!
//! This crate provides:
//! - Domain models (accounts, notes, tasks, events, insights, focus sessions)
//! - Repository traits with explicit create/update command structs
//! - The shared error type and structured-logging field constants
//! - Pure derived-metrics and day-bucketing engines
//! - The fail-soft [`ServiceOutcome`] type used by every external adapter
//! - Built-in note templates

pub mod analytics;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod outcome;
pub mod templates;
pub mod traits;

pub use analytics::{
    completion_rate, daily_buckets, session_rollup, summarize, week_stats, ActivityWindow,
    AnalyticsReport, CategoryCount, CategoryHistograms, CoachingWindow, DailyBucket,
    SessionSample, TaskTotals, WeekStats, WindowSummary, COACHING_WINDOW_DAYS,
    DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS,
};
pub use error::{Error, Result};
pub use metrics::{truncate_chars, BodyMetrics};
pub use models::*;
pub use outcome::ServiceOutcome;
pub use templates::{builtin_template, BuiltinTemplate, BUILTIN_TEMPLATES};
pub use traits::*;
