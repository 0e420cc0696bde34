use std::env;
use std::time::Duration;

/// Campaign policy values. The cooldown windows and batch pacing are
/// deployment policy, not invariants, so they all come from the environment
/// with the defaults observed in production.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// Rows processed per batch invocation.
    pub batch_size: u64,
    /// Pause between successive dispatches within one batch.
    pub inter_send_delay: Duration,
    /// Minimum age of the previous attempt before a resend-unopened pass
    /// may pick the row up again.
    pub resend_cooldown: chrono::Duration,
    /// Minimum age of the previous attempt for segment-targeted sends.
    pub segment_cooldown: chrono::Duration,
}

impl CampaignConfig {
    pub fn from_env() -> Self {
        let batch_size = env::var("LEADWIRE_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let inter_send_delay_ms = env::var("LEADWIRE_INTER_SEND_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let resend_cooldown_mins = env::var("LEADWIRE_RESEND_COOLDOWN_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let segment_cooldown_mins = env::var("LEADWIRE_SEGMENT_COOLDOWN_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 60);

        Self {
            batch_size,
            inter_send_delay: Duration::from_millis(inter_send_delay_ms),
            resend_cooldown: chrono::Duration::minutes(resend_cooldown_mins),
            segment_cooldown: chrono::Duration::minutes(segment_cooldown_mins),
        }
    }
}
