//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt;

use leadwire::config::campaign::CampaignConfig;
use leadwire::models::invite;
use leadwire::services::security::encode_token;
use leadwire::services::token::generate_token;
use leadwire::state::AppState;
pub use leadwire::test_helpers::{create_test_db, create_test_user, RecordingMailer};

/// App state wired to a recording mailer; the mailer handle is returned so
/// tests can assert on what was dispatched.
pub fn build_app_state(db: DatabaseConnection) -> (AppState, Arc<RecordingMailer>) {
    let mailer = RecordingMailer::shared();
    (AppState::new(db, mailer.clone()), mailer)
}

/// Campaign policy with no pacing delay, so batch tests run instantly.
pub fn test_campaign_config() -> CampaignConfig {
    CampaignConfig {
        batch_size: 10,
        inter_send_delay: std::time::Duration::ZERO,
        resend_cooldown: Duration::hours(1),
        segment_cooldown: Duration::hours(24),
    }
}

/// Declarative invite seed. Everything defaults to a freshly created,
/// never-sent row; tests set only the timestamps the scenario needs.
pub struct InviteSeed {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub email_id: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub bounced_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_send_attempt_at: Option<DateTime<Utc>>,
    pub launch_email_sent_at: Option<DateTime<Utc>>,
    pub launch_email_opened_at: Option<DateTime<Utc>>,
    pub launch_email_clicked_at: Option<DateTime<Utc>>,
    pub launch_last_send_attempt_at: Option<DateTime<Utc>>,
    pub conversion_email_sent_at: Option<DateTime<Utc>>,
}

impl InviteSeed {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            created_at: Utc::now(),
            sent_at: None,
            email_id: None,
            delivered_at: None,
            opened_at: None,
            clicked_at: None,
            bounced_at: None,
            claimed_at: None,
            expires_at: None,
            last_send_attempt_at: None,
            launch_email_sent_at: None,
            launch_email_opened_at: None,
            launch_email_clicked_at: None,
            launch_last_send_attempt_at: None,
            conversion_email_sent_at: None,
        }
    }

    /// A row whose invite email went out `hours_ago` hours ago, with the
    /// attempt and provider id stamped the way a real send leaves them.
    pub fn sent(email: &str, hours_ago: i64) -> Self {
        let at = Utc::now() - Duration::hours(hours_ago);
        let mut seed = Self::new(email);
        seed.created_at = at - Duration::hours(1);
        seed.sent_at = Some(at);
        seed.email_id = Some(format!("seed-{}", email));
        seed.last_send_attempt_at = Some(at);
        seed
    }

    pub async fn insert(self, db: &DatabaseConnection) -> invite::Model {
        let send_count = if self.sent_at.is_some() { 1 } else { 0 };
        let row = invite::ActiveModel {
            email: Set(self.email.to_lowercase()),
            invite_token: Set(generate_token()),
            created_at: Set(self.created_at),
            sent_at: Set(self.sent_at),
            email_id: Set(self.email_id),
            delivered_at: Set(self.delivered_at),
            opened_at: Set(self.opened_at),
            clicked_at: Set(self.clicked_at),
            bounced_at: Set(self.bounced_at),
            claimed_at: Set(self.claimed_at),
            expires_at: Set(self.expires_at),
            last_send_attempt_at: Set(self.last_send_attempt_at),
            send_count: Set(send_count),
            launch_email_sent_at: Set(self.launch_email_sent_at),
            launch_email_opened_at: Set(self.launch_email_opened_at),
            launch_email_clicked_at: Set(self.launch_email_clicked_at),
            launch_last_send_attempt_at: Set(self.launch_last_send_attempt_at),
            conversion_email_sent_at: Set(self.conversion_email_sent_at),
            ..Default::default()
        };
        row.insert(db).await.unwrap()
    }
}

pub fn admin_token() -> String {
    encode_token(1, "admin@example.com", "admin").unwrap()
}

pub fn member_token(user_id: i64) -> String {
    encode_token(user_id, "member@example.com", "member").unwrap()
}

/// POST a command payload to the invite endpoint, optionally authenticated,
/// and return status plus parsed JSON body.
pub async fn post_command(
    app: Router,
    token: Option<&str>,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .uri("/api/invites/")
        .method("POST")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes).expect("Response must be valid JSON");
    (status, body)
}
