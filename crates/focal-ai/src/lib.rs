//! # focal-ai
//!
//! Generation-service client and coaching adapters for focal.
//!
//! This crate provides:
//! - An OpenAI-compatible chat-completions client with env-driven config
//! - Daily insight generation with a fixed fallback report
//! - Sentiment scoring for note bodies
//! - Task duration estimation
//! - Conversational coaching replies
//!
//! Every adapter returns [`ServiceOutcome`] so callers can observe and
//! log fallbacks without the enclosing request ever failing.
//!
//! # Example
//!
//! ```rust,no_run
//! use focal_ai::{analyze_sentiment, GenerationClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GenerationClient::from_env().unwrap();
//!     let outcome = analyze_sentiment(&client, "Shipped the release, feeling great").await;
//!     println!("{:?}", outcome.value());
//! }
//! ```

pub mod chat;
pub mod client;
pub mod coach;
pub mod estimate;
pub mod sentiment;
pub mod types;

// Re-export core types
pub use focal_core::*;

pub use chat::{coach_chat, APOLOGY};
pub use client::{
    GenerationClient, GenerationConfig, DEFAULT_BASE_URL, DEFAULT_GEN_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use coach::{
    daily_insight, fallback_payload, insight_record, InsightPayload, DAILY_SUMMARY_TYPE,
};
pub use estimate::{estimate_task_hours, DEFAULT_ESTIMATE_HOURS};
pub use sentiment::analyze_sentiment;
