use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::invite::{self, InviteStatus};
use crate::services::segmentation::{last_activity, Segment, SegmentedLeads};

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: i64,
    pub email: String,
    pub invite_token: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub bounced_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub send_count: i32,
}

impl InviteResponse {
    pub fn from_model(row: invite::Model, now: DateTime<Utc>) -> Self {
        Self {
            status: row.status(now),
            id: row.id,
            email: row.email,
            invite_token: row.invite_token,
            created_at: row.created_at,
            sent_at: row.sent_at,
            delivered_at: row.delivered_at,
            opened_at: row.opened_at,
            clicked_at: row.clicked_at,
            claimed_at: row.claimed_at,
            bounced_at: row.bounced_at,
            expires_at: row.expires_at,
            send_count: row.send_count,
        }
    }
}

/// `detailed_list` row: the full record plus the derived views.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedInviteResponse {
    #[serde(flatten)]
    pub invite: invite::Model,
    pub status: InviteStatus,
    pub segment: Segment,
    pub last_activity_at: DateTime<Utc>,
}

impl DetailedInviteResponse {
    pub fn from_model(row: invite::Model, segment: Segment, now: DateTime<Utc>) -> Self {
        Self {
            status: row.status(now),
            segment,
            last_activity_at: last_activity(&row),
            invite: row,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateReport {
    pub created: u64,
    pub skipped: u64,
}

/// Anonymous token validation. Not-found tokens report `valid: false`
/// rather than an error, so the endpoint leaks nothing about which tokens
/// exist beyond a boolean.
#[derive(Debug, Clone, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    pub claimed: bool,
    pub expired: bool,
    /// Masked recipient, e.g. `j***@example.com`, for the claim page.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteStats {
    pub total: u64,
    pub pending: u64,
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub claimed: u64,
    pub bounced: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchCampaignStats {
    pub total: u64,
    pub sent: u64,
    pub opened: u64,
    pub clicked: u64,
}

/// Outcome of one batch invocation. `remaining` is the continuation signal:
/// callers keep re-invoking until `complete` is true. Partial failure is a
/// normal outcome; inspect `errors` even on success.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub sent: u64,
    pub remaining: u64,
    pub complete: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentedLeadsResponse {
    pub counts: SegmentCounts,
    #[serde(flatten)]
    pub leads: SegmentedLeads,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentCounts {
    pub signed_up: usize,
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    pub bounced: usize,
}

impl SegmentedLeadsResponse {
    pub fn from_leads(leads: SegmentedLeads) -> Self {
        Self {
            counts: SegmentCounts {
                signed_up: leads.signed_up.len(),
                hot: leads.hot.len(),
                warm: leads.warm.len(),
                cold: leads.cold.len(),
                bounced: leads.bounced.len(),
            },
            leads,
        }
    }
}

/// Result of a single direct dispatch (test sends, manual conversion).
#[derive(Debug, Clone, Serialize)]
pub struct SingleSendReport {
    pub email: String,
    pub message_id: String,
}

/// Mask an address for anonymous display: first character kept, local part
/// elided, domain kept.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}
