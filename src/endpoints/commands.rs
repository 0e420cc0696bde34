//! The command endpoint: one POST accepting `{action, ...params}`.
//!
//! The payload is decoded into a `Command` variant, the caller's privilege is
//! checked against the variant's access level, and only then does the handler
//! touch the store.

use axum::{extract::State, routing::post, Json, Router};
use sea_orm::{EntityTrait, QueryOrder};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::middleware::MaybeCaller;
use crate::models::{invite, prelude::*};
use crate::schemas::{Command, SegmentedLeadsResponse};
use crate::services::templates::Template;
use crate::services::{campaign, invites, segmentation};
use crate::state::AppState;

pub fn command_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(dispatch_command))
        .with_state(state)
}

async fn dispatch_command(
    State(state): State<AppState>,
    caller: MaybeCaller,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>> {
    let command: Command = serde_json::from_value(payload)
        .map_err(|e| AppError::Validation(format!("Unknown or malformed action: {}", e)))?;

    caller.require(command.access())?;

    tracing::debug!(action = command.name(), user_id = ?caller.user_id(), "Dispatching command");

    let db = &state.db;
    let mailer = state.mailer.as_ref();
    let config = &CONFIG.campaign;

    let result = match command {
        Command::List => to_value(invites::list_invites(db).await?)?,
        Command::DetailedList => to_value(invites::detailed_list(db).await?)?,
        Command::Stats => to_value(invites::invite_stats(db).await?)?,
        Command::LaunchCampaignStats => to_value(invites::launch_campaign_stats(db).await?)?,
        Command::GetSegmentedLeads => {
            let registered = invites::registered_emails(db).await?;
            let rows = Invite::find()
                .order_by_desc(invite::Column::CreatedAt)
                .all(db)
                .await?;
            let leads = segmentation::segment_leads(rows, &registered);
            to_value(SegmentedLeadsResponse::from_leads(leads))?
        }
        Command::GetConversionLeads => to_value(invites::conversion_leads(db).await?)?,

        Command::BulkCreate { emails } => to_value(invites::bulk_create(db, emails).await?)?,
        Command::SendInvite { invite_id } => {
            to_value(invites::send_invite_email(db, mailer, invite_id, false).await?)?
        }
        Command::Resend { invite_id } => {
            to_value(invites::send_invite_email(db, mailer, invite_id, true).await?)?
        }
        Command::Delete { invite_id } => {
            invites::delete_invite(db, invite_id).await?;
            serde_json::json!({ "deleted": invite_id })
        }
        Command::Claim { token } => {
            let user_id = caller
                .user_id()
                .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
            to_value(invites::claim(db, &token, user_id).await?)?
        }

        Command::ValidateToken { token } => to_value(invites::validate_token(db, &token).await?)?,
        Command::SendTestLaunchEmail { test_email } => {
            to_value(invites::send_test_email(mailer, Template::Launch, &test_email).await?)?
        }
        Command::SendTestConversionEmail { test_email } => {
            to_value(invites::send_test_email(mailer, Template::Conversion, &test_email).await?)?
        }
        Command::SendManualConversionEmail { manual_email } => {
            to_value(invites::send_manual_conversion_email(db, mailer, &manual_email).await?)?
        }

        Command::SendAllPending => {
            to_value(campaign::run_batch(db, mailer, campaign::CampaignKind::Invite, config).await?)?
        }
        Command::ResendAllUnopened => to_value(
            campaign::run_batch(db, mailer, campaign::CampaignKind::ResendUnopened, config).await?,
        )?,
        Command::SendLaunchCampaign => {
            to_value(campaign::run_batch(db, mailer, campaign::CampaignKind::Launch, config).await?)?
        }
        Command::SendToSegment { segment } => {
            if !segment.is_targetable() {
                return Err(AppError::Validation(format!(
                    "Segment {} cannot be targeted; choose hot, warm or cold",
                    segment
                )));
            }
            to_value(
                campaign::run_batch(db, mailer, campaign::CampaignKind::Segment(segment), config)
                    .await?,
            )?
        }
        Command::RetryFailed => to_value(
            campaign::run_batch(db, mailer, campaign::CampaignKind::RetryFailed, config).await?,
        )?,
        Command::SendConversionCampaign => to_value(
            campaign::run_batch(db, mailer, campaign::CampaignKind::Conversion, config).await?,
        )?,
    };

    Ok(Json(result))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
