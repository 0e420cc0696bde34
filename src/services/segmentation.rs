//! Engagement segmentation.
//!
//! Classifies each invite row into exactly one bucket, cross-referenced
//! against the authoritative registered-email set. The precedence order is
//! fixed: bounced > signed-up > hot > warm > cold. Membership in the
//! registered set is checked rather than `claimed_at`, since a user can
//! register without ever touching their invite link.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::invite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    SignedUp,
    Hot,
    Warm,
    Cold,
    Bounced,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::SignedUp => "signed_up",
            Segment::Hot => "hot",
            Segment::Warm => "warm",
            Segment::Cold => "cold",
            Segment::Bounced => "bounced",
        }
    }

    /// Only the engagement buckets may be targeted by a follow-up send;
    /// bounced and signed-up rows are excluded from every campaign, so a
    /// send aimed at those buckets is a caller mistake, not an empty batch.
    pub fn is_targetable(&self) -> bool {
        matches!(self, Segment::Hot | Segment::Warm | Segment::Cold)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five mutually exclusive buckets, each sorted by most recent activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SegmentedLeads {
    pub signed_up: Vec<invite::Model>,
    pub hot: Vec<invite::Model>,
    pub warm: Vec<invite::Model>,
    pub cold: Vec<invite::Model>,
    pub bounced: Vec<invite::Model>,
}

impl SegmentedLeads {
    pub fn bucket(&self, segment: Segment) -> &Vec<invite::Model> {
        match segment {
            Segment::SignedUp => &self.signed_up,
            Segment::Hot => &self.hot,
            Segment::Warm => &self.warm,
            Segment::Cold => &self.cold,
            Segment::Bounced => &self.bounced,
        }
    }

    pub fn total(&self) -> usize {
        self.signed_up.len() + self.hot.len() + self.warm.len() + self.cold.len()
            + self.bounced.len()
    }
}

/// Classify a single row. Precedence: bounced, then registered, then click
/// signals (hot), then open signals (warm), else cold.
pub fn classify(row: &invite::Model, registered: &HashSet<String>) -> Segment {
    if row.bounced_at.is_some() {
        return Segment::Bounced;
    }
    if registered.contains(&row.email.trim().to_lowercase()) {
        return Segment::SignedUp;
    }
    if row.clicked_at.is_some() || row.launch_email_clicked_at.is_some() {
        return Segment::Hot;
    }
    if row.opened_at.is_some() || row.launch_email_opened_at.is_some() {
        return Segment::Warm;
    }
    Segment::Cold
}

/// Most-recent-activity timestamp used for bucket ordering. Several
/// timestamps may be set at once; the most specific funnel signal wins.
/// Rows with nothing set fall back to `created_at`.
pub fn last_activity(row: &invite::Model) -> DateTime<Utc> {
    row.claimed_at
        .or(row.clicked_at)
        .or(row.launch_email_clicked_at)
        .or(row.opened_at)
        .or(row.launch_email_opened_at)
        .or(row.delivered_at)
        .or(row.sent_at)
        .unwrap_or(row.created_at)
}

/// Partition rows into the five buckets, each sorted descending by activity.
pub fn segment_leads(rows: Vec<invite::Model>, registered: &HashSet<String>) -> SegmentedLeads {
    let mut leads = SegmentedLeads::default();

    for row in rows {
        match classify(&row, registered) {
            Segment::Bounced => leads.bounced.push(row),
            Segment::SignedUp => leads.signed_up.push(row),
            Segment::Hot => leads.hot.push(row),
            Segment::Warm => leads.warm.push(row),
            Segment::Cold => leads.cold.push(row),
        }
    }

    for bucket in [
        &mut leads.signed_up,
        &mut leads.hot,
        &mut leads.warm,
        &mut leads.cold,
        &mut leads.bounced,
    ] {
        bucket.sort_by(|a, b| last_activity(b).cmp(&last_activity(a)));
    }

    leads
}
