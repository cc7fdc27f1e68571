//! Integration tests for the note repository.
//!
//! This test suite validates:
//! - Insert derives text metrics and encodes tags
//! - Listing excludes archived notes, filters, searches, and paginates
//! - ILIKE wildcards in search input are treated literally
//! - Updates recompute metrics when the body changes and can clear category
//! - Template listing only returns template-flagged notes
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use focal_db::test_fixtures::{note_request, TestDatabase};
use focal_db::{
    CreateNoteRequest, ListNotesRequest, NoteRepository, Sentiment, SentimentLabel,
    UpdateNoteRequest,
};

#[tokio::test]
#[ignore] // Requires database connection
async fn test_insert_derives_metrics_and_tags() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-insert").await;

    let mut req = note_request("Standup", "Quick sync with the platform team today");
    req.tags = vec!["work".to_string(), "standup".to_string()];
    req.category = Some("meetings".to_string());

    let note = test_db
        .db
        .notes
        .insert(account.id, req)
        .await
        .expect("Failed to insert note");

    assert_eq!(note.word_count, 7);
    assert_eq!(note.character_count, 39);
    assert_eq!(note.reading_time, 1);
    assert_eq!(note.tags, vec!["work", "standup"]);
    assert_eq!(note.category.as_deref(), Some("meetings"));
    assert_eq!(note.sentiment_label, SentimentLabel::Neutral);
    assert!(!note.is_archived);
    assert!(note.last_accessed_at.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_list_filters_and_pagination() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-list").await;
    let notes = &test_db.db.notes;

    for i in 0..3 {
        let mut req = note_request(&format!("Journal {i}"), "Day in review");
        req.note_type = "journal".to_string();
        notes.insert(account.id, req).await.expect("insert");
    }
    let mut favorite = note_request("Pinned ideas", "Keep these around");
    favorite.category = Some("ideas".to_string());
    let favorite = notes.insert(account.id, favorite).await.expect("insert");
    notes
        .update(
            account.id,
            favorite.id,
            UpdateNoteRequest {
                is_favorite: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    // Archived notes disappear from every listing.
    let archived = notes
        .insert(account.id, note_request("Old drafts", "stale"))
        .await
        .expect("insert");
    notes
        .update(
            account.id,
            archived.id,
            UpdateNoteRequest {
                is_archived: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let all = notes
        .list(account.id, ListNotesRequest::default())
        .await
        .expect("list");
    assert_eq!(all.total, 4);
    assert_eq!(all.page, 1);
    assert_eq!(all.per_page, 20);
    assert_eq!(all.total_pages, 1);
    assert!(all.notes.iter().all(|n| !n.is_archived));

    let journals = notes
        .list(
            account.id,
            ListNotesRequest {
                note_type: Some("journal".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(journals.total, 3);

    let favorites = notes
        .list(
            account.id,
            ListNotesRequest {
                favorite: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(favorites.total, 1);
    assert_eq!(favorites.notes[0].title, "Pinned ideas");

    let page2 = notes
        .list(
            account.id,
            ListNotesRequest {
                page: Some(2),
                per_page: Some(3),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(page2.total, 4);
    assert_eq!(page2.total_pages, 2);
    assert_eq!(page2.notes.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_search_is_substring_and_literal() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-search").await;
    let notes = &test_db.db.notes;

    notes
        .insert(account.id, note_request("Roadmap Q3", "Ship the 100% milestone"))
        .await
        .expect("insert");
    notes
        .insert(account.id, note_request("Groceries", "Milk and eggs"))
        .await
        .expect("insert");

    let hits = notes
        .list(
            account.id,
            ListNotesRequest {
                search: Some("roadmap".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(hits.total, 1, "title match should be case-insensitive");

    let body_hits = notes
        .list(
            account.id,
            ListNotesRequest {
                search: Some("milestone".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(body_hits.total, 1);

    // "100%" must match the literal text, not act as a wildcard.
    let literal = notes
        .list(
            account.id,
            ListNotesRequest {
                search: Some("100%".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(literal.total, 1);

    let wildcard_probe = notes
        .list(
            account.id,
            ListNotesRequest {
                search: Some("%".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("list");
    assert_eq!(wildcard_probe.total, 1, "bare % only matches the note containing one");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_update_recomputes_metrics_and_clears_category() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-update").await;
    let notes = &test_db.db.notes;

    let mut req = note_request("Draft", "one two three");
    req.category = Some("inbox".to_string());
    let note = notes.insert(account.id, req).await.expect("insert");
    assert_eq!(note.word_count, 3);

    let updated = notes
        .update(
            account.id,
            note.id,
            UpdateNoteRequest {
                body: Some("one two three four five".to_string()),
                sentiment: Some(Sentiment {
                    score: 0.6,
                    label: SentimentLabel::Positive,
                }),
                category: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("update")
        .expect("note exists");

    assert_eq!(updated.word_count, 5);
    assert_eq!(updated.character_count, 23);
    assert_eq!(updated.sentiment_label, SentimentLabel::Positive);
    assert!((updated.sentiment_score - 0.6).abs() < f64::EPSILON);
    assert!(updated.category.is_none(), "Some(None) clears the category");
    assert!(updated.updated_at > note.updated_at);

    // An empty update is a read, not a write.
    let unchanged = notes
        .update(account.id, note.id, UpdateNoteRequest::default())
        .await
        .expect("update")
        .expect("note exists");
    assert_eq!(unchanged.updated_at, updated.updated_at);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_delete_and_ownership_scoping() {
    let mut test_db = TestDatabase::new().await;
    let owner = test_db.create_account("note-owner").await;
    let stranger = test_db.create_account("note-stranger").await;
    let notes = &test_db.db.notes;

    let note = notes
        .insert(owner.id, note_request("Private", "mine"))
        .await
        .expect("insert");

    // Another account can neither see nor delete it.
    assert!(notes
        .fetch(stranger.id, note.id)
        .await
        .expect("fetch")
        .is_none());
    assert!(!notes.delete(stranger.id, note.id).await.expect("delete"));

    assert!(notes.delete(owner.id, note.id).await.expect("delete"));
    assert!(notes
        .fetch(owner.id, note.id)
        .await
        .expect("fetch")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_touch_access_stamps_timestamp() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-touch").await;
    let notes = &test_db.db.notes;

    let note = notes
        .insert(account.id, note_request("Read me", "body"))
        .await
        .expect("insert");
    assert!(note.last_accessed_at.is_none());

    notes.touch_access(note.id).await.expect("touch");

    let fresh = notes
        .fetch(account.id, note.id)
        .await
        .expect("fetch")
        .expect("note exists");
    assert!(fresh.last_accessed_at.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_template_notes_are_separate() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-template").await;
    let notes = &test_db.db.notes;

    let template = notes
        .insert(
            account.id,
            CreateNoteRequest {
                is_template: true,
                ..note_request("Weekly review", "## Wins\n\n## Blockers")
            },
        )
        .await
        .expect("insert");
    notes
        .insert(account.id, note_request("Ordinary", "plain note"))
        .await
        .expect("insert");

    let templates = notes.list_templates(account.id).await.expect("templates");
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, template.id);

    let fetched = notes
        .fetch_template(account.id, template.id)
        .await
        .expect("fetch template");
    assert!(fetched.is_some());

    // A non-template note is not reachable through the template lookup.
    let ordinary_id = notes
        .list(account.id, ListNotesRequest::default())
        .await
        .expect("list")
        .notes
        .iter()
        .find(|n| !n.is_template)
        .map(|n| n.id)
        .expect("ordinary note listed");
    assert!(notes
        .fetch_template(account.id, ordinary_id)
        .await
        .expect("fetch template")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_set_remote_page_stamps_id() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("note-remote").await;
    let notes = &test_db.db.notes;

    let note = notes
        .insert(account.id, note_request("Synced", "pushed upstream"))
        .await
        .expect("insert");
    assert!(note.remote_page_id.is_none());

    notes
        .set_remote_page(note.id, "page-8412")
        .await
        .expect("set remote page");

    let fresh = notes
        .fetch(account.id, note.id)
        .await
        .expect("fetch")
        .expect("note exists");
    assert_eq!(fresh.remote_page_id.as_deref(), Some("page-8412"));

    test_db.cleanup().await;
}
