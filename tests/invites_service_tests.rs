//! Invite service integration tests
//!
//! Covers:
//! - bulk creation (dedup, normalization, skip counting)
//! - single sends and resends, including terminal-state guards
//! - claim flow and token validation
//! - deletion and the stats views

use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

mod common;
use common::{create_test_db, create_test_user, InviteSeed, RecordingMailer};

use leadwire::error::AppError;
use leadwire::models::{invite, prelude::*};
use leadwire::services::invites;

// ============================================================================
// bulk_create
// ============================================================================

#[tokio::test]
async fn test_bulk_create_normalizes_and_collapses_duplicates() {
    let db = create_test_db().await;

    let report = invites::bulk_create(
        &db,
        vec![
            "Alice@Example.com".to_string(),
            "  alice@example.com ".to_string(),
            "bob@example.com".to_string(),
        ],
    )
    .await
    .unwrap();

    // Two unique addresses; the in-request duplicate is collapsed silently
    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 0);

    let stored = Invite::find()
        .filter(invite::Column::Email.eq("alice@example.com"))
        .one(&db)
        .await
        .unwrap();
    assert!(stored.is_some(), "Address must be stored lower-cased");
}

#[tokio::test]
async fn test_bulk_create_skips_existing_and_invalid() {
    let db = create_test_db().await;
    InviteSeed::new("existing@example.com").insert(&db).await;

    let report = invites::bulk_create(
        &db,
        vec![
            "existing@example.com".to_string(),
            "not-an-email".to_string(),
            "new@example.com".to_string(),
        ],
    )
    .await
    .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 2);
}

#[tokio::test]
async fn test_bulk_create_assigns_unique_tokens() {
    let db = create_test_db().await;
    invites::bulk_create(
        &db,
        vec!["a@example.com".to_string(), "b@example.com".to_string()],
    )
    .await
    .unwrap();

    let rows = Invite::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].invite_token, rows[1].invite_token);
    for row in rows {
        assert!(row.invite_token.starts_with("ea_"));
        assert_eq!(row.invite_token.len(), 27);
    }
}

// ============================================================================
// send_invite_email
// ============================================================================

#[tokio::test]
async fn test_send_invite_stamps_lifecycle_fields() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let row = InviteSeed::new("fresh@example.com").insert(&db).await;

    let response = invites::send_invite_email(&db, &mailer, row.id, false)
        .await
        .unwrap();

    assert!(response.sent_at.is_some());
    assert_eq!(response.send_count, 1);
    assert_eq!(mailer.sent_count().await, 1);

    let stored = Invite::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert!(stored.email_id.is_some());
    assert!(stored.last_send_attempt_at.is_some());
}

#[tokio::test]
async fn test_resend_keeps_original_sent_at() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let row = InviteSeed::sent("sent@example.com", 2).insert(&db).await;
    let original_sent_at = row.sent_at.unwrap();

    let response = invites::send_invite_email(&db, &mailer, row.id, true)
        .await
        .unwrap();

    assert_eq!(response.sent_at, Some(original_sent_at));
    assert_eq!(response.send_count, 2);
}

#[tokio::test]
async fn test_resend_of_never_sent_invite_is_conflict() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let row = InviteSeed::new("fresh@example.com").insert(&db).await;

    let err = invites::send_invite_email(&db, &mailer, row.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(mailer.sent_count().await, 0);
}

#[tokio::test]
async fn test_send_to_claimed_invite_is_conflict_without_dispatch() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let mut seed = InviteSeed::sent("claimed@example.com", 5);
    seed.claimed_at = Some(Utc::now() - Duration::hours(1));
    let row = seed.insert(&db).await;

    let err = invites::send_invite_email(&db, &mailer, row.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(mailer.sent_count().await, 0, "Claimed rows must never be emailed");
}

#[tokio::test]
async fn test_send_to_bounced_invite_is_conflict() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let mut seed = InviteSeed::sent("bounced@example.com", 5);
    seed.bounced_at = Some(Utc::now() - Duration::hours(1));
    let row = seed.insert(&db).await;

    let err = invites::send_invite_email(&db, &mailer, row.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(mailer.sent_count().await, 0);
}

#[tokio::test]
async fn test_send_to_unknown_invite_is_not_found() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();

    let err = invites::send_invite_email(&db, &mailer, 9999, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_dispatch_leaves_attempt_without_confirmation() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    mailer.fail_for("down@example.com").await;
    let row = InviteSeed::new("down@example.com").insert(&db).await;

    let err = invites::send_invite_email(&db, &mailer, row.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Dispatch(_)));

    // Attempt stamped, success fields untouched: the retry sweep's signature
    let stored = Invite::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert!(stored.last_send_attempt_at.is_some());
    assert!(stored.sent_at.is_none());
    assert!(stored.email_id.is_none());
    assert_eq!(stored.send_count, 0);
}

// ============================================================================
// claim / validate_token
// ============================================================================

#[tokio::test]
async fn test_claim_marks_invite_and_records_user() {
    let db = create_test_db().await;
    let row = InviteSeed::sent("joiner@example.com", 1).insert(&db).await;
    let user = create_test_user(&db, "joiner@example.com").await;

    let response = invites::claim(&db, &row.invite_token, user.id).await.unwrap();
    assert!(response.claimed_at.is_some());

    let stored = Invite::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.user_id, Some(user.id));
}

#[tokio::test]
async fn test_claim_twice_is_conflict() {
    let db = create_test_db().await;
    let row = InviteSeed::sent("joiner@example.com", 1).insert(&db).await;

    invites::claim(&db, &row.invite_token, 1).await.unwrap();
    let err = invites::claim(&db, &row.invite_token, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // First claimer wins; the claim never moves
    let stored = Invite::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.user_id, Some(1));
}

#[tokio::test]
async fn test_claim_expired_invite_is_conflict() {
    let db = create_test_db().await;
    let mut seed = InviteSeed::sent("late@example.com", 48);
    seed.expires_at = Some(Utc::now() - Duration::hours(1));
    let row = seed.insert(&db).await;

    let err = invites::claim(&db, &row.invite_token, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_claim_unknown_token_is_not_found() {
    let db = create_test_db().await;
    let err = invites::claim(&db, "ea_doesnotexist000000000000", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_validate_token_masks_email() {
    let db = create_test_db().await;
    let row = InviteSeed::sent("johndoe@example.com", 1).insert(&db).await;

    let result = invites::validate_token(&db, &row.invite_token).await.unwrap();
    assert!(result.valid);
    assert!(!result.claimed);
    assert!(!result.expired);
    assert_eq!(result.email.as_deref(), Some("j***@example.com"));
}

#[tokio::test]
async fn test_validate_unknown_token_reports_invalid_not_error() {
    let db = create_test_db().await;

    let result = invites::validate_token(&db, "ea_nope0000000000000000000")
        .await
        .unwrap();
    assert!(!result.valid);
    assert!(result.email.is_none());
}

#[tokio::test]
async fn test_validate_claimed_token() {
    let db = create_test_db().await;
    let mut seed = InviteSeed::sent("done@example.com", 10);
    seed.claimed_at = Some(Utc::now() - Duration::hours(2));
    let row = seed.insert(&db).await;

    let result = invites::validate_token(&db, &row.invite_token).await.unwrap();
    assert!(!result.valid);
    assert!(result.claimed);
}

// ============================================================================
// delete / listing / stats
// ============================================================================

#[tokio::test]
async fn test_delete_invite() {
    let db = create_test_db().await;
    let row = InviteSeed::new("gone@example.com").insert(&db).await;

    invites::delete_invite(&db, row.id).await.unwrap();
    assert!(Invite::find_by_id(row.id).one(&db).await.unwrap().is_none());

    let err = invites::delete_invite(&db, row.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_invite_stats_counts_funnel_stages() {
    let db = create_test_db().await;
    InviteSeed::new("pending@example.com").insert(&db).await;
    InviteSeed::sent("sent@example.com", 1).insert(&db).await;
    let mut opened = InviteSeed::sent("opened@example.com", 2);
    opened.opened_at = Some(Utc::now() - Duration::hours(1));
    opened.insert(&db).await;
    let mut bounced = InviteSeed::sent("bounced@example.com", 3);
    bounced.bounced_at = Some(Utc::now() - Duration::hours(2));
    bounced.insert(&db).await;

    let stats = invites::invite_stats(&db).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.sent, 3);
    assert_eq!(stats.opened, 1);
    assert_eq!(stats.bounced, 1);
    assert_eq!(stats.claimed, 0);
}

#[tokio::test]
async fn test_detailed_list_derives_status_and_segment() {
    let db = create_test_db().await;
    let mut opened = InviteSeed::sent("engaged@example.com", 2);
    opened.opened_at = Some(Utc::now() - Duration::hours(1));
    opened.insert(&db).await;
    create_test_user(&db, "member@example.com").await;
    InviteSeed::sent("member@example.com", 5).insert(&db).await;

    let rows = invites::detailed_list(&db).await.unwrap();
    assert_eq!(rows.len(), 2);

    let engaged = rows
        .iter()
        .find(|r| r.invite.email == "engaged@example.com")
        .unwrap();
    assert_eq!(engaged.segment.as_str(), "warm");
    assert_eq!(engaged.status.as_str(), "sent");

    let member = rows
        .iter()
        .find(|r| r.invite.email == "member@example.com")
        .unwrap();
    assert_eq!(member.segment.as_str(), "signed_up");
}

// ============================================================================
// test sends / manual conversion
// ============================================================================

#[tokio::test]
async fn test_send_test_email_does_not_touch_store() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();

    use leadwire::services::templates::Template;
    invites::send_test_email(&mailer, Template::Launch, "qa@example.com")
        .await
        .unwrap();

    assert_eq!(mailer.sent_count().await, 1);
    assert_eq!(Invite::find().all(&db).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_send_test_email_rejects_invalid_address() {
    let mailer = RecordingMailer::new();

    use leadwire::services::templates::Template;
    let err = invites::send_test_email(&mailer, Template::Launch, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(mailer.sent_count().await, 0);
}

#[tokio::test]
async fn test_manual_conversion_stamps_matching_row() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();
    let row = InviteSeed::sent("lead@example.com", 24).insert(&db).await;

    invites::send_manual_conversion_email(&db, &mailer, "Lead@Example.com")
        .await
        .unwrap();

    let stored = Invite::find_by_id(row.id).one(&db).await.unwrap().unwrap();
    assert!(stored.conversion_email_sent_at.is_some());
    assert!(stored.conversion_email_id.is_some());
}

#[tokio::test]
async fn test_manual_conversion_without_row_is_fire_and_forget() {
    let db = create_test_db().await;
    let mailer = RecordingMailer::new();

    let report = invites::send_manual_conversion_email(&db, &mailer, "outsider@example.com")
        .await
        .unwrap();

    assert_eq!(report.email, "outsider@example.com");
    assert_eq!(mailer.sent_count().await, 1);
    assert_eq!(Invite::find().all(&db).await.unwrap().len(), 0);
}
