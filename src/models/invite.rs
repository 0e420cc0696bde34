use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per invited email address. The timestamp fields are the canonical
/// lifecycle representation; the coarse pending/sent/claimed/expired status is
/// derived from them, never stored.
///
/// The original, launch and conversion campaigns each carry their own
/// independent set of sent/opened/clicked fields and never cascade into each
/// other.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub invite_token: String,
    pub created_at: DateTimeUtc,

    // Original invite campaign
    pub sent_at: Option<DateTimeUtc>,
    pub email_id: Option<String>,
    pub delivered_at: Option<DateTimeUtc>,
    pub opened_at: Option<DateTimeUtc>,
    pub clicked_at: Option<DateTimeUtc>,
    pub bounced_at: Option<DateTimeUtc>,
    pub bounce_type: Option<String>,
    pub claimed_at: Option<DateTimeUtc>,
    pub user_id: Option<i64>,
    pub expires_at: Option<DateTimeUtc>,
    pub last_send_attempt_at: Option<DateTimeUtc>,
    pub send_count: i32,

    // Launch campaign
    pub launch_email_sent_at: Option<DateTimeUtc>,
    pub launch_email_id: Option<String>,
    pub launch_email_opened_at: Option<DateTimeUtc>,
    pub launch_email_clicked_at: Option<DateTimeUtc>,
    pub launch_last_send_attempt_at: Option<DateTimeUtc>,

    // Conversion campaign
    pub conversion_email_sent_at: Option<DateTimeUtc>,
    pub conversion_email_id: Option<String>,
    pub conversion_last_send_attempt_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Coarse lifecycle flag, derived from the timestamp fields on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Sent,
    Claimed,
    Expired,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Sent => "sent",
            InviteStatus::Claimed => "claimed",
            InviteStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Model {
    /// True once the invite has reached a terminal state that excludes it
    /// from any further state-changing send operation.
    pub fn is_terminal(&self) -> bool {
        self.claimed_at.is_some() || self.bounced_at.is_some()
    }

    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires_at.map(|e| e <= now).unwrap_or(false)
    }

    /// Derive the coarse status. Claimed wins over expiry; a claimed invite
    /// never regresses.
    pub fn status(&self, now: DateTimeUtc) -> InviteStatus {
        if self.claimed_at.is_some() {
            InviteStatus::Claimed
        } else if self.is_expired(now) {
            InviteStatus::Expired
        } else if self.sent_at.is_some() {
            InviteStatus::Sent
        } else {
            InviteStatus::Pending
        }
    }
}
