//! Single-invite operations and admin views.
//!
//! Every operation re-reads the store at its start; the store is the sole
//! source of truth and nothing is cached across invocations.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::models::{invite, prelude::*};
use crate::schemas::{
    mask_email, BulkCreateReport, DetailedInviteResponse, InviteResponse, InviteStats,
    LaunchCampaignStats, SingleSendReport, TokenValidation,
};
use crate::services::mailer::Mailer;
use crate::services::segmentation::{classify, Segment};
use crate::services::templates::{render, Template};
use crate::services::token::generate_token;
use crate::state::DbConn;

/// Canonical form of an address: trimmed, lower-cased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The authoritative registered-email set, read fresh from the identity
/// system's users table.
pub async fn registered_emails(db: &DbConn) -> Result<HashSet<String>> {
    let users = User::find().all(db).await?;
    Ok(users.into_iter().map(|u| normalize_email(&u.email)).collect())
}

/// Create invite rows for new unique addresses. Duplicates within the
/// request are collapsed silently; addresses that already have a row (or
/// fail syntax validation) are counted as skipped.
pub async fn bulk_create(db: &DbConn, emails: Vec<String>) -> Result<BulkCreateReport> {
    let existing: HashSet<String> = Invite::find()
        .all(db)
        .await?
        .into_iter()
        .map(|i| i.email)
        .collect();

    let now = Utc::now();
    let mut seen: HashSet<String> = HashSet::new();
    let mut created = 0u64;
    let mut skipped = 0u64;

    for raw in emails {
        let email = normalize_email(&raw);
        if !seen.insert(email.clone()) {
            continue; // same address twice in one request
        }
        if !email.validate_email() {
            tracing::warn!(email = %email, "Skipping invalid email address");
            skipped += 1;
            continue;
        }
        if existing.contains(&email) {
            skipped += 1;
            continue;
        }

        let row = invite::ActiveModel {
            email: Set(email),
            invite_token: Set(generate_token()),
            created_at: Set(now),
            send_count: Set(0),
            ..Default::default()
        };
        row.insert(db).await?;
        created += 1;
    }

    tracing::info!(created, skipped, "Bulk invite creation finished");
    Ok(BulkCreateReport { created, skipped })
}

pub async fn get_invite(db: &DbConn, id: i64) -> Result<invite::Model> {
    Invite::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invite {} not found", id)))
}

pub async fn find_by_token(db: &DbConn, token: &str) -> Result<Option<invite::Model>> {
    Ok(Invite::find()
        .filter(invite::Column::InviteToken.eq(token))
        .one(db)
        .await?)
}

/// Terminal-state guard shared by all send paths. Claimed and bounced rows
/// never receive another send.
fn ensure_sendable(row: &invite::Model) -> Result<()> {
    if row.claimed_at.is_some() {
        return Err(AppError::Conflict(format!(
            "Invite for {} is already claimed",
            row.email
        )));
    }
    if row.bounced_at.is_some() {
        return Err(AppError::Conflict(format!(
            "Invite for {} has bounced and cannot be emailed",
            row.email
        )));
    }
    Ok(())
}

/// Send (or re-send) the original invite email for one row.
///
/// The attempt timestamp is written before dispatch so a crash mid-send
/// leaves a detectable "attempted but unconfirmed" row; the success fields
/// are only written after the dispatcher accepts the message.
pub async fn send_invite_email(
    db: &DbConn,
    mailer: &dyn Mailer,
    id: i64,
    resend: bool,
) -> Result<InviteResponse> {
    let row = get_invite(db, id).await?;
    ensure_sendable(&row)?;
    if resend && row.sent_at.is_none() {
        return Err(AppError::Conflict(format!(
            "Invite for {} has never been sent; use send_invite first",
            row.email
        )));
    }

    let now = Utc::now();
    let mut mark = row.clone().into_active_model();
    mark.last_send_attempt_at = Set(Some(now));
    let row = mark.update(db).await?;

    let html = render(Template::Invite, &row.email, &row.invite_token);
    let message_id = mailer
        .send(&row.email, Template::Invite.subject(), &html)
        .await
        .map_err(AppError::Dispatch)?;

    let first_send = row.sent_at.is_none();
    let send_count = row.send_count;
    let mut confirm = row.into_active_model();
    if first_send {
        confirm.sent_at = Set(Some(now));
    }
    confirm.email_id = Set(Some(message_id));
    confirm.send_count = Set(send_count + 1);
    let row = confirm.update(db).await?;

    tracing::info!(invite_id = row.id, email = %row.email, resend, "Invite email dispatched");
    Ok(InviteResponse::from_model(row, now))
}

/// Claim an invite: the external identity system confirmed registration.
/// Terminal; at most once.
pub async fn claim(db: &DbConn, token: &str, user_id: i64) -> Result<InviteResponse> {
    let row = find_by_token(db, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite token not found".to_string()))?;

    if row.claimed_at.is_some() {
        return Err(AppError::Conflict("Invite is already claimed".to_string()));
    }
    let now = Utc::now();
    if row.is_expired(now) {
        return Err(AppError::Conflict("Invite has expired".to_string()));
    }

    let mut am = row.into_active_model();
    am.claimed_at = Set(Some(now));
    am.user_id = Set(Some(user_id));
    let row = am.update(db).await?;

    tracing::info!(invite_id = row.id, user_id, "Invite claimed");
    Ok(InviteResponse::from_model(row, now))
}

/// Anonymous token check for the claim page.
pub async fn validate_token(db: &DbConn, token: &str) -> Result<TokenValidation> {
    let now = Utc::now();
    Ok(match find_by_token(db, token).await? {
        Some(row) => TokenValidation {
            valid: row.claimed_at.is_none() && !row.is_expired(now),
            claimed: row.claimed_at.is_some(),
            expired: row.is_expired(now),
            email: Some(mask_email(&row.email)),
        },
        None => TokenValidation {
            valid: false,
            claimed: false,
            expired: false,
            email: None,
        },
    })
}

pub async fn delete_invite(db: &DbConn, id: i64) -> Result<()> {
    let result = Invite::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Invite {} not found", id)));
    }
    tracing::info!(invite_id = id, "Invite deleted");
    Ok(())
}

pub async fn list_invites(db: &DbConn) -> Result<Vec<InviteResponse>> {
    let now = Utc::now();
    let rows = Invite::find()
        .order_by_desc(invite::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| InviteResponse::from_model(r, now))
        .collect())
}

/// Full rows plus derived status, segment and activity, ordered by recency.
pub async fn detailed_list(db: &DbConn) -> Result<Vec<DetailedInviteResponse>> {
    let now = Utc::now();
    let registered = registered_emails(db).await?;
    let rows = Invite::find()
        .order_by_desc(invite::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let segment = classify(&r, &registered);
            DetailedInviteResponse::from_model(r, segment, now)
        })
        .collect())
}

/// Funnel counts for the original campaign.
pub async fn invite_stats(db: &DbConn) -> Result<InviteStats> {
    let total = Invite::find().count(db).await?;
    let sent = Invite::find()
        .filter(invite::Column::SentAt.is_not_null())
        .count(db)
        .await?;
    let delivered = Invite::find()
        .filter(invite::Column::DeliveredAt.is_not_null())
        .count(db)
        .await?;
    let opened = Invite::find()
        .filter(invite::Column::OpenedAt.is_not_null())
        .count(db)
        .await?;
    let clicked = Invite::find()
        .filter(invite::Column::ClickedAt.is_not_null())
        .count(db)
        .await?;
    let claimed = Invite::find()
        .filter(invite::Column::ClaimedAt.is_not_null())
        .count(db)
        .await?;
    let bounced = Invite::find()
        .filter(invite::Column::BouncedAt.is_not_null())
        .count(db)
        .await?;

    Ok(InviteStats {
        total,
        pending: total - sent,
        sent,
        delivered,
        opened,
        clicked,
        claimed,
        bounced,
    })
}

/// Funnel counts for the launch campaign.
pub async fn launch_campaign_stats(db: &DbConn) -> Result<LaunchCampaignStats> {
    let total = Invite::find().count(db).await?;
    let sent = Invite::find()
        .filter(invite::Column::LaunchEmailSentAt.is_not_null())
        .count(db)
        .await?;
    let opened = Invite::find()
        .filter(invite::Column::LaunchEmailOpenedAt.is_not_null())
        .count(db)
        .await?;
    let clicked = Invite::find()
        .filter(invite::Column::LaunchEmailClickedAt.is_not_null())
        .count(db)
        .await?;

    Ok(LaunchCampaignStats {
        total,
        sent,
        opened,
        clicked,
    })
}

/// Leads worth a conversion nudge: engaged (hot or warm), not yet sent a
/// conversion email. Bounced and already-registered addresses classify out.
pub async fn conversion_leads(db: &DbConn) -> Result<Vec<invite::Model>> {
    let registered = registered_emails(db).await?;
    let rows = Invite::find()
        .filter(invite::Column::ConversionEmailSentAt.is_null())
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter(|r| matches!(classify(r, &registered), Segment::Hot | Segment::Warm))
        .collect())
}

/// Dispatch a template to an explicit address without touching any row.
pub async fn send_test_email(
    mailer: &dyn Mailer,
    template: Template,
    to: &str,
) -> Result<SingleSendReport> {
    let email = normalize_email(to);
    if !email.validate_email() {
        return Err(AppError::Validation(format!("Invalid email address: {}", to)));
    }

    // Test sends use a throwaway token so tracking links stay well-formed.
    let html = render(template, &email, &generate_token());
    let message_id = mailer
        .send(&email, template.subject(), &html)
        .await
        .map_err(AppError::Dispatch)?;

    Ok(SingleSendReport { email, message_id })
}

/// One-off conversion email to an explicit address. If an invite row exists
/// for the address, its conversion lifecycle is stamped; otherwise the send
/// is fire-and-forget.
pub async fn send_manual_conversion_email(
    db: &DbConn,
    mailer: &dyn Mailer,
    manual_email: &str,
) -> Result<SingleSendReport> {
    let email = normalize_email(manual_email);
    if !email.validate_email() {
        return Err(AppError::Validation(format!(
            "Invalid email address: {}",
            manual_email
        )));
    }

    let row = Invite::find()
        .filter(invite::Column::Email.eq(&email))
        .one(db)
        .await?;

    if let Some(ref r) = row {
        ensure_sendable(r)?;
    }

    let token = row
        .as_ref()
        .map(|r| r.invite_token.clone())
        .unwrap_or_else(generate_token);
    let html = render(Template::Conversion, &email, &token);
    let message_id = mailer
        .send(&email, Template::Conversion.subject(), &html)
        .await
        .map_err(AppError::Dispatch)?;

    if let Some(r) = row {
        let now = Utc::now();
        let mut am = r.into_active_model();
        am.conversion_email_sent_at = Set(Some(now));
        am.conversion_email_id = Set(Some(message_id.clone()));
        am.conversion_last_send_attempt_at = Set(Some(now));
        am.update(db).await?;
    }

    Ok(SingleSendReport { email, message_id })
}
