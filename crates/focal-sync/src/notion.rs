//! Note-sync client speaking the Notion page API.
//!
//! Pushes a note as a new page in one fixed destination database. The
//! page carries the note's title, tags, type, publish status, and
//! creation date as properties, plus the body as paragraph blocks.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use focal_core::{truncate_chars, Error, Note, Result};

/// Default API endpoint.
pub const DEFAULT_NOTION_URL: &str = "https://api.notion.com/v1";

/// Protocol version header sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// At most this many paragraphs are pushed per page.
const MAX_PARAGRAPHS: usize = 10;

/// Remote limit on a rich-text block's content length, in characters.
const MAX_PARAGRAPH_CHARS: usize = 2000;

/// Configuration for the note-sync client.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// Integration token; absent leaves the client disabled.
    pub token: Option<String>,
    /// Destination database for synced pages.
    pub database_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOTION_URL.to_string(),
            token: None,
            database_id: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Response shape for a created page.
#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct NotionErrorResponse {
    message: String,
}

/// Client for a Notion-style page API.
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
}

impl NotionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NotionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing note-sync client: url={}, configured={}",
            config.base_url,
            config.token.is_some() && config.database_id.is_some()
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// Reads `NOTION_BASE_URL`, `NOTION_TOKEN`, `NOTION_DATABASE_ID`, and
    /// `NOTION_TIMEOUT_SECONDS`. A missing token or database id leaves the
    /// client constructed but disabled.
    pub fn from_env() -> Result<Self> {
        let config = NotionConfig {
            base_url: std::env::var("NOTION_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_NOTION_URL.to_string()),
            token: std::env::var("NOTION_TOKEN").ok(),
            database_id: std::env::var("NOTION_DATABASE_ID").ok(),
            timeout_seconds: std::env::var("NOTION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Self::new(config)
    }

    /// Whether a token and destination database are both present.
    pub fn is_configured(&self) -> bool {
        self.config.token.is_some() && self.config.database_id.is_some()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    /// Push one note as a new page in the destination database.
    ///
    /// Returns the remote page id, which the caller stamps onto the note
    /// for future re-sync.
    pub async fn sync_note(&self, note: &Note) -> Result<String> {
        let (token, database_id) = match (&self.config.token, &self.config.database_id) {
            (Some(token), Some(database_id)) => (token, database_id),
            _ => {
                return Err(Error::Config(
                    "Note-sync integration is not configured".to_string(),
                ))
            }
        };

        debug!("Syncing note {} to remote database {}", note.id, database_id);

        let request = json!({
            "parent": { "database_id": database_id },
            "properties": note_properties(note),
            "children": body_blocks(&note.body),
        });

        let url = format!("{}/pages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Sync(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: NotionErrorResponse = response.json().await.unwrap_or(NotionErrorResponse {
                message: "Unknown error".to_string(),
            });
            return Err(Error::Sync(format!(
                "Note-sync service returned {}: {}",
                status, body.message
            )));
        }

        let page: CreatedPage = response
            .json()
            .await
            .map_err(|e| Error::Sync(format!("Failed to parse response: {}", e)))?;

        debug!("Synced note {} as remote page {}", note.id, page.id);
        Ok(page.id)
    }
}

/// Page properties for a note: title, tags, type, publish status, and
/// creation date.
fn note_properties(note: &Note) -> Value {
    json!({
        "Name": {
            "title": [{ "text": { "content": note.title } }]
        },
        "Tags": {
            "multi_select": note.tags.iter().map(|tag| json!({ "name": tag })).collect::<Vec<_>>()
        },
        "Type": {
            "select": { "name": note.note_type }
        },
        "Status": {
            "select": { "name": if note.is_public { "Published" } else { "Draft" } }
        },
        "Created": {
            "date": { "start": note.created_at.to_rfc3339() }
        }
    })
}

/// Paragraph blocks for a note body: split on blank lines, at most
/// [`MAX_PARAGRAPHS`] blocks, each trimmed and capped at
/// [`MAX_PARAGRAPH_CHARS`] characters. Blank paragraphs are skipped but
/// still count against the cap.
fn body_blocks(body: &str) -> Vec<Value> {
    body.split("\n\n")
        .take(MAX_PARAGRAPHS)
        .filter_map(|paragraph| {
            let trimmed = paragraph.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{
                        "type": "text",
                        "text": { "content": truncate_chars(trimmed, MAX_PARAGRAPH_CHARS) }
                    }]
                }
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use focal_core::SentimentLabel;
    use uuid::Uuid;

    fn sample_note(body: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            title: "Weekly review".to_string(),
            body: body.to_string(),
            content_type: "markdown".to_string(),
            note_type: "journal".to_string(),
            emoji: "📝".to_string(),
            tags: vec!["review".to_string(), "weekly".to_string()],
            category: Some("Work".to_string()),
            character_count: 0,
            word_count: 0,
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
    fn test_properties_carry_title_tags_and_type() {
        let note = sample_note("body");
        let props = note_properties(&note);

        assert_eq!(
            props["Name"]["title"][0]["text"]["content"],
            "Weekly review"
        );
        assert_eq!(props["Tags"]["multi_select"][0]["name"], "review");
        assert_eq!(props["Tags"]["multi_select"][1]["name"], "weekly");
        assert_eq!(props["Type"]["select"]["name"], "journal");
        assert!(props["Created"]["date"]["start"].is_string());
    }

    #[test]
    fn test_status_follows_public_flag() {
        let mut note = sample_note("body");
        assert_eq!(
            note_properties(&note)["Status"]["select"]["name"],
            "Draft"
        );

        note.is_public = true;
        assert_eq!(
            note_properties(&note)["Status"]["select"]["name"],
            "Published"
        );
    }

    #[test]
    fn test_blocks_split_on_blank_lines_and_skip_empties() {
        let blocks = body_blocks("First paragraph.\n\n\n\nSecond one.");
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0]["paragraph"]["rich_text"][0]["text"]["content"],
            "First paragraph."
        );
        assert_eq!(
            blocks[1]["paragraph"]["rich_text"][0]["text"]["content"],
            "Second one."
        );
    }

    #[test]
    fn test_blocks_capped_at_ten_paragraphs() {
        let body = (1..=14)
            .map(|n| format!("Paragraph {}", n))
            .collect::<Vec<_>>()
            .join("\n\n");
        let blocks = body_blocks(&body);
        assert_eq!(blocks.len(), 10);
        assert_eq!(
            blocks[9]["paragraph"]["rich_text"][0]["text"]["content"],
            "Paragraph 10"
        );
    }

    #[test]
    fn test_long_paragraph_truncated() {
        let body = "x".repeat(2600);
        let blocks = body_blocks(&body);
        assert_eq!(blocks.len(), 1);
        let content = blocks[0]["paragraph"]["rich_text"][0]["text"]["content"]
            .as_str()
            .expect("content string");
        assert_eq!(content.chars().count(), 2000);
    }

    #[test]
    fn test_empty_body_yields_no_blocks() {
        assert!(body_blocks("").is_empty());
        assert!(body_blocks("   \n\n  ").is_empty());
    }
}
