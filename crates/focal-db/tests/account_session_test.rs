//! Integration tests for account and session repositories.
//!
//! This test suite validates:
//! - Account registration and duplicate email rejection
//! - Partial settings updates touch only the requested fields
//! - Login stamping
//! - Token digest resolution, expiry, revocation, and purging
//!
//! **IMPORTANT**: These tests require a fully migrated PostgreSQL database.
//! Run migrations first: `sqlx migrate run`

use chrono::{Duration, Utc};
use focal_db::credentials::{generate_access_token, hash_password, token_digest, verify_password};
use focal_db::test_fixtures::{TestDatabase, TEST_PASSWORD};
use focal_db::{
    AccountRepository, CreateAccountRequest, SessionRepository, UpdateSettingsRequest,
};
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires database connection
async fn test_account_registration_and_lookup() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("register").await;

    let found = test_db
        .db
        .accounts
        .fetch_by_email(&account.email)
        .await
        .expect("Failed to fetch account by email")
        .expect("Account not found by email");

    assert_eq!(found.id, account.id);
    assert_eq!(found.username, account.username);
    assert!(verify_password(TEST_PASSWORD, &found.password_hash));
    assert!(!verify_password("wrong password", &found.password_hash));

    // Fresh accounts carry the schema defaults.
    assert_eq!(found.theme, "light");
    assert_eq!(found.timezone, "UTC");
    assert_eq!(found.plan, "free");
    assert!(found.ai_coaching_enabled);
    assert!(found.last_login_at.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_duplicate_email_rejected() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("dup").await;

    let duplicate = test_db
        .db
        .accounts
        .insert(CreateAccountRequest {
            email: account.email.clone(),
            username: "someone-else".to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hash"),
            avatar_url: Some("https://ui-avatars.com/api/?name=x".to_string()),
        })
        .await;

    assert!(duplicate.is_err(), "second insert with same email must fail");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_settings_update_is_partial() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("settings").await;

    let updated = test_db
        .db
        .accounts
        .update_settings(
            account.id,
            UpdateSettingsRequest {
                theme: Some("dark".to_string()),
                break_duration: Some(10),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update settings");

    assert_eq!(updated.theme, "dark");
    assert_eq!(updated.break_duration, 10);
    // Untouched fields keep their values.
    assert_eq!(updated.timezone, account.timezone);
    assert_eq!(updated.focus_session_duration, account.focus_session_duration);
    assert!(updated.updated_at >= account.updated_at);

    // An empty update is a read.
    let unchanged = test_db
        .db
        .accounts
        .update_settings(account.id, UpdateSettingsRequest::default())
        .await
        .expect("Empty update should succeed");
    assert_eq!(unchanged.theme, "dark");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_record_login_stamps_timestamp() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("login").await;
    assert!(account.last_login_at.is_none());

    test_db
        .db
        .accounts
        .record_login(account.id)
        .await
        .expect("Failed to record login");

    let fresh = test_db
        .db
        .accounts
        .fetch(account.id)
        .await
        .expect("Failed to fetch account")
        .expect("Account not found");
    assert!(fresh.last_login_at.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_session_lifecycle() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("session").await;

    let token = generate_access_token();
    let digest = token_digest(&token);

    let session = test_db
        .db
        .sessions
        .insert(account.id, &digest, Utc::now() + Duration::days(7))
        .await
        .expect("Failed to insert session");
    assert_eq!(session.account_id, account.id);

    // The digest resolves to its account; an unknown digest does not.
    let resolved = test_db
        .db
        .sessions
        .resolve(&digest)
        .await
        .expect("Failed to resolve session")
        .expect("Session should resolve");
    assert_eq!(resolved.id, account.id);

    let other_digest = token_digest(&generate_access_token());
    assert!(test_db
        .db
        .sessions
        .resolve(&other_digest)
        .await
        .expect("Resolve should not error")
        .is_none());

    // Revocation is terminal and idempotent in effect.
    assert!(test_db.db.sessions.revoke(&digest).await.expect("revoke"));
    assert!(test_db
        .db
        .sessions
        .resolve(&digest)
        .await
        .expect("Resolve should not error")
        .is_none());
    assert!(!test_db.db.sessions.revoke(&digest).await.expect("revoke"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_expired_sessions_do_not_resolve() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("expiry").await;

    let digest = token_digest(&generate_access_token());
    test_db
        .db
        .sessions
        .insert(account.id, &digest, Utc::now() - Duration::hours(1))
        .await
        .expect("Failed to insert expired session");

    assert!(test_db
        .db
        .sessions
        .resolve(&digest)
        .await
        .expect("Resolve should not error")
        .is_none());

    let purged = test_db
        .db
        .sessions
        .purge_expired()
        .await
        .expect("Failed to purge expired sessions");
    assert!(purged >= 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_cascade_removes_sessions_with_account() {
    let mut test_db = TestDatabase::new().await;
    let account = test_db.create_account("cascade").await;
    let account_id = account.id;

    let digest = token_digest(&generate_access_token());
    test_db
        .db
        .sessions
        .insert(account_id, &digest, Utc::now() + Duration::days(7))
        .await
        .expect("Failed to insert session");

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(account_id)
        .execute(test_db.db.pool())
        .await
        .expect("Failed to delete account");

    assert!(test_db
        .db
        .sessions
        .resolve(&digest)
        .await
        .expect("Resolve should not error")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_fetch_unknown_account_is_none() {
    let test_db = TestDatabase::new().await;

    let missing = test_db
        .db
        .accounts
        .fetch(Uuid::new_v4())
        .await
        .expect("Fetch should not error");
    assert!(missing.is_none());

    test_db.cleanup().await;
}
