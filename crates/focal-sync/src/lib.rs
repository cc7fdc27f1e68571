//! # focal-sync
//!
//! Note-sync and issue-tracker clients for focal.
//!
//! This crate provides:
//! - A Notion-compatible page client that pushes notes into a database
//! - A GitHub-compatible issue client that opens issues from tasks
//!
//! Both clients construct without credentials and report themselves as
//! unconfigured; the API layer turns that into a 400 before any request
//! leaves the process.
//!
//! # Example
//!
//! ```rust,no_run
//! use focal_sync::GithubClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GithubClient::from_env().unwrap();
//!     let repos = client.list_repos().await;
//!     println!("{} repositories visible", repos.len());
//! }
//! ```

pub mod github;
pub mod notion;

// Re-export core types
pub use focal_core::*;

pub use github::{GithubClient, GithubConfig, GithubRepo, DEFAULT_GITHUB_URL};
pub use notion::{NotionClient, NotionConfig, DEFAULT_NOTION_URL, NOTION_VERSION};
