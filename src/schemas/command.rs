//! The command catalogue.
//!
//! Incoming requests are a single JSON object tagged by `action`; serde turns
//! that into one variant per action, so an unknown action fails at
//! deserialization and the privilege each action needs is a static property
//! of its variant rather than an ad-hoc string-membership test.

use serde::Deserialize;

use crate::middleware::AccessLevel;
use crate::services::segmentation::Segment;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    // Read-only admin views
    List,
    DetailedList,
    Stats,
    LaunchCampaignStats,
    GetSegmentedLeads,
    GetConversionLeads,

    // Row creation / mutation
    BulkCreate { emails: Vec<String> },
    SendInvite { invite_id: i64 },
    Resend { invite_id: i64 },
    Delete { invite_id: i64 },
    Claim { token: String },

    // Anonymous allow-list
    ValidateToken { token: String },
    SendTestLaunchEmail { test_email: String },

    // Batch campaigns
    SendAllPending,
    ResendAllUnopened,
    SendLaunchCampaign,
    SendToSegment { segment: Segment },
    RetryFailed,
    SendConversionCampaign,

    // Conversion one-offs
    SendTestConversionEmail { test_email: String },
    SendManualConversionEmail { manual_email: String },
}

impl Command {
    /// The privilege a command requires, checked before any store access.
    pub fn access(&self) -> AccessLevel {
        match self {
            Command::ValidateToken { .. } | Command::SendTestLaunchEmail { .. } => {
                AccessLevel::Anonymous
            }
            Command::Claim { .. } => AccessLevel::Authenticated,
            _ => AccessLevel::Admin,
        }
    }

    /// Action name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::DetailedList => "detailed_list",
            Command::Stats => "stats",
            Command::LaunchCampaignStats => "launch_campaign_stats",
            Command::GetSegmentedLeads => "get_segmented_leads",
            Command::GetConversionLeads => "get_conversion_leads",
            Command::BulkCreate { .. } => "bulk_create",
            Command::SendInvite { .. } => "send_invite",
            Command::Resend { .. } => "resend",
            Command::Delete { .. } => "delete",
            Command::Claim { .. } => "claim",
            Command::ValidateToken { .. } => "validate_token",
            Command::SendTestLaunchEmail { .. } => "send_test_launch_email",
            Command::SendAllPending => "send_all_pending",
            Command::ResendAllUnopened => "resend_all_unopened",
            Command::SendLaunchCampaign => "send_launch_campaign",
            Command::SendToSegment { .. } => "send_to_segment",
            Command::RetryFailed => "retry_failed",
            Command::SendConversionCampaign => "send_conversion_campaign",
            Command::SendTestConversionEmail { .. } => "send_test_conversion_email",
            Command::SendManualConversionEmail { .. } => "send_manual_conversion_email",
        }
    }
}
