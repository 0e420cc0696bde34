//! Batch campaign runner.
//!
//! One invocation processes one bounded batch: select eligible rows, then per
//! row mark the attempt, render, dispatch, confirm on success, and pause
//! between sends. The eligible count is re-queried afterwards so the caller
//! can keep re-invoking until `complete` is true.
//!
//! Delivery is at-least-once. There is no lock around select/mark/dispatch/
//! confirm; overlapping invocations inside a cooldown window can double-send,
//! and a crash between dispatch and confirm leaves a row with an attempt
//! timestamp but no provider id. The `RetryFailed` kind exists to sweep up
//! exactly those rows. Per-row dispatch failures never abort the batch.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, QueryOrder, Set};

use crate::config::campaign::CampaignConfig;
use crate::error::Result;
use crate::models::{invite, prelude::*};
use crate::schemas::BatchReport;
use crate::services::invites::{normalize_email, registered_emails};
use crate::services::mailer::Mailer;
use crate::services::segmentation::{classify, Segment};
use crate::services::templates::{render, Template};
use crate::state::DbConn;

/// Which campaign a batch invocation drives. Each kind owns its eligibility
/// predicate and writes only its own lifecycle columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignKind {
    /// First send of the original invite email to never-sent rows.
    Invite,
    /// Re-send the invite to sent-but-never-opened rows, cooldown-gated.
    ResendUnopened,
    /// Launch announcement to rows that have not received it.
    Launch,
    /// Conversion nudge to engaged (hot/warm) rows without one yet.
    Conversion,
    /// Sweep rows with an attempt timestamp but no provider id: a previous
    /// invocation crashed or the provider timed out between mark and confirm.
    RetryFailed,
    /// Launch-template follow-up targeted at one engagement segment,
    /// cooldown-gated so overlapping invocations stay approximately-once.
    Segment(Segment),
}

impl CampaignKind {
    pub fn template(&self) -> Template {
        match self {
            CampaignKind::Invite | CampaignKind::ResendUnopened | CampaignKind::RetryFailed => {
                Template::Invite
            }
            CampaignKind::Launch | CampaignKind::Segment(_) => Template::Launch,
            CampaignKind::Conversion => Template::Conversion,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CampaignKind::Invite => "invite",
            CampaignKind::ResendUnopened => "resend_unopened",
            CampaignKind::Launch => "launch",
            CampaignKind::Conversion => "conversion",
            CampaignKind::RetryFailed => "retry_failed",
            CampaignKind::Segment(_) => "segment",
        }
    }

    /// Full eligibility predicate. All conditions must hold; bounced,
    /// claimed and already-registered rows are excluded for every kind.
    fn is_eligible(
        &self,
        row: &invite::Model,
        registered: &HashSet<String>,
        now: DateTime<Utc>,
        config: &CampaignConfig,
    ) -> bool {
        if row.is_terminal() {
            return false;
        }
        if registered.contains(&normalize_email(&row.email)) {
            return false;
        }

        match self {
            CampaignKind::Invite => row.sent_at.is_none(),
            CampaignKind::ResendUnopened => {
                row.sent_at.is_some()
                    && row.opened_at.is_none()
                    && row.clicked_at.is_none()
                    && cooled_down(row.last_send_attempt_at, config.resend_cooldown, now)
            }
            CampaignKind::Launch => row.launch_email_sent_at.is_none(),
            CampaignKind::Conversion => {
                row.conversion_email_sent_at.is_none()
                    && matches!(classify(row, registered), Segment::Hot | Segment::Warm)
            }
            CampaignKind::RetryFailed => {
                row.last_send_attempt_at.is_some() && row.email_id.is_none()
            }
            CampaignKind::Segment(segment) => {
                classify(row, registered) == *segment
                    && cooled_down(
                        row.launch_last_send_attempt_at,
                        config.segment_cooldown,
                        now,
                    )
            }
        }
    }

    fn mark_attempt(&self, row: invite::Model, now: DateTime<Utc>) -> invite::ActiveModel {
        let mut am = row.into_active_model();
        match self {
            CampaignKind::Invite | CampaignKind::ResendUnopened | CampaignKind::RetryFailed => {
                am.last_send_attempt_at = Set(Some(now));
            }
            CampaignKind::Launch | CampaignKind::Segment(_) => {
                am.launch_last_send_attempt_at = Set(Some(now));
            }
            CampaignKind::Conversion => {
                am.conversion_last_send_attempt_at = Set(Some(now));
            }
        }
        am
    }

    fn mark_success(
        &self,
        row: invite::Model,
        message_id: String,
        now: DateTime<Utc>,
    ) -> invite::ActiveModel {
        let first_send = row.sent_at.is_none();
        let send_count = row.send_count;
        let mut am = row.into_active_model();
        am.send_count = Set(send_count + 1);
        match self {
            CampaignKind::Invite | CampaignKind::ResendUnopened | CampaignKind::RetryFailed => {
                if first_send {
                    am.sent_at = Set(Some(now));
                }
                am.email_id = Set(Some(message_id));
            }
            CampaignKind::Launch | CampaignKind::Segment(_) => {
                am.launch_email_sent_at = Set(Some(now));
                am.launch_email_id = Set(Some(message_id));
            }
            CampaignKind::Conversion => {
                am.conversion_email_sent_at = Set(Some(now));
                am.conversion_email_id = Set(Some(message_id));
            }
        }
        am
    }
}

/// A row is off cooldown when it was never attempted, or the last attempt is
/// older than the window.
fn cooled_down(
    last_attempt: Option<DateTime<Utc>>,
    window: chrono::Duration,
    now: DateTime<Utc>,
) -> bool {
    match last_attempt {
        None => true,
        Some(at) => now - at >= window,
    }
}

/// Select all currently eligible rows for a campaign, oldest first. The
/// registered set is re-read on every call since registration can happen
/// between batches.
pub async fn select_eligible(
    db: &DbConn,
    kind: CampaignKind,
    config: &CampaignConfig,
) -> Result<Vec<invite::Model>> {
    let now = Utc::now();
    let registered = registered_emails(db).await?;
    let rows = Invite::find()
        .order_by_asc(invite::Column::CreatedAt)
        .order_by_asc(invite::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter(|r| kind.is_eligible(r, &registered, now, config))
        .collect())
}

/// Run one batch of a campaign and report progress.
pub async fn run_batch(
    db: &DbConn,
    mailer: &dyn Mailer,
    kind: CampaignKind,
    config: &CampaignConfig,
) -> Result<BatchReport> {
    run_batch_with(db, mailer, kind, config, config.batch_size, config.inter_send_delay).await
}

/// As `run_batch`, with explicit batch size and pacing.
pub async fn run_batch_with(
    db: &DbConn,
    mailer: &dyn Mailer,
    kind: CampaignKind,
    config: &CampaignConfig,
    batch_size: u64,
    delay: Duration,
) -> Result<BatchReport> {
    let eligible = select_eligible(db, kind, config).await?;
    let batch: Vec<invite::Model> = eligible.into_iter().take(batch_size as usize).collect();
    let batch_len = batch.len();

    tracing::info!(
        campaign = kind.name(),
        batch = batch_len,
        "Starting campaign batch"
    );

    let mut sent = 0u64;
    let mut errors: Vec<String> = Vec::new();

    for (i, row) in batch.into_iter().enumerate() {
        let now = Utc::now();

        // Attempt is recorded before dispatch so a crash mid-batch leaves a
        // detectable attempted-but-unconfirmed row, not a silently lost one.
        let row = kind.mark_attempt(row, now).update(db).await?;

        let html = render(kind.template(), &row.email, &row.invite_token);
        match mailer
            .send(&row.email, kind.template().subject(), &html)
            .await
        {
            Ok(message_id) => {
                kind.mark_success(row, message_id, now).update(db).await?;
                sent += 1;
            }
            Err(e) => {
                // Per-row dispatch failure is never fatal to the batch.
                tracing::warn!(campaign = kind.name(), email = %row.email, error = %e, "Dispatch failed");
                errors.push(format!("{}: {}", row.email, e));
            }
        }

        if i + 1 < batch_len {
            tokio::time::sleep(delay).await;
        }
    }

    let remaining = select_eligible(db, kind, config).await?.len() as u64;
    let report = BatchReport {
        sent,
        remaining,
        complete: remaining == 0,
        errors,
    };

    tracing::info!(
        campaign = kind.name(),
        sent = report.sent,
        remaining = report.remaining,
        errors = report.errors.len(),
        "Campaign batch finished"
    );
    Ok(report)
}
