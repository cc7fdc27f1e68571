//! Integration tests for the note-sync client.
//!
//! These tests run against a local wiremock server; no external
//! services are contacted.

use chrono::Utc;
use focal_sync::notion::{NotionClient, NotionConfig, NOTION_VERSION};
use focal_sync::{Note, SentimentLabel};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> NotionConfig {
    NotionConfig {
        base_url,
        token: Some("secret-token".to_string()),
        database_id: Some("db-42".to_string()),
        timeout_seconds: 5,
    }
}

fn sample_note(body: &str) -> Note {
    Note {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        title: "Weekly review".to_string(),
        body: body.to_string(),
        content_type: "markdown".to_string(),
        note_type: "journal".to_string(),
        emoji: "📝".to_string(),
        tags: vec!["review".to_string()],
        category: None,
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

fn created_page_reply() -> serde_json::Value {
    json!({"object": "page", "id": "page-123"})
}

#[tokio::test]
async fn test_sync_note_creates_page_in_database() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(header("Notion-Version", NOTION_VERSION))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "parent": {"database_id": "db-42"},
            "properties": {
                "Name": {"title": [{"text": {"content": "Weekly review"}}]},
                "Type": {"select": {"name": "journal"}},
                "Tags": {"multi_select": [{"name": "review"}]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_page_reply()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NotionClient::new(test_config(mock_server.uri())).expect("client");
    let note = sample_note("Reviewed the sprint.");
    let page_id = client.sync_note(&note).await.expect("page id");

    assert_eq!(page_id, "page-123");
}

#[tokio::test]
async fn test_public_note_syncs_as_published() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "properties": {"Status": {"select": {"name": "Published"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_page_reply()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NotionClient::new(test_config(mock_server.uri())).expect("client");
    let mut note = sample_note("Shared widely.");
    note.is_public = true;

    client.sync_note(&note).await.expect("page id");
}

#[tokio::test]
async fn test_body_paragraphs_become_blocks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_page_reply()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NotionClient::new(test_config(mock_server.uri())).expect("client");
    let note = sample_note("First paragraph.\n\nSecond paragraph.");
    client.sync_note(&note).await.expect("page id");

    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);

    let payload: serde_json::Value = requests[0].body_json().expect("json body");
    let children = payload["children"].as_array().expect("children array");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["type"], "paragraph");
    assert_eq!(
        children[0]["paragraph"]["rich_text"][0]["text"]["content"],
        "First paragraph."
    );
    assert_eq!(
        children[1]["paragraph"]["rich_text"][0]["text"]["content"],
        "Second paragraph."
    );
}

#[tokio::test]
async fn test_remote_failure_surfaces_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "object": "error",
            "status": 500,
            "code": "internal_server_error",
            "message": "Something went wrong"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NotionClient::new(test_config(mock_server.uri())).expect("client");
    let note = sample_note("Body text here.");
    let err = client.sync_note(&note).await.expect_err("sync error");

    let message = err.to_string();
    assert!(message.contains("500"), "unexpected error: {}", message);
    assert!(
        message.contains("Something went wrong"),
        "unexpected error: {}",
        message
    );
}

#[tokio::test]
async fn test_unconfigured_client_never_calls_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_page_reply()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = NotionConfig {
        base_url: mock_server.uri(),
        token: None,
        database_id: Some("db-42".to_string()),
        timeout_seconds: 5,
    };
    let client = NotionClient::new(config).expect("client");
    assert!(!client.is_configured());

    let note = sample_note("Body text here.");
    let err = client.sync_note(&note).await.expect_err("config error");
    assert!(err.to_string().contains("not configured"));
}
