use std::env;

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub use_tls: bool,
    pub from_address: String,
    pub from_name: String,
    /// Base URL for the tracking endpoints embedded in rendered emails
    /// (click redirect and open pixel live behind this host, not here).
    pub tracking_base_url: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("LEADWIRE_SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("LEADWIRE_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("LEADWIRE_SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("LEADWIRE_SMTP_PASSWORD").unwrap_or_default(),
            use_tls: env::var("LEADWIRE_SMTP_TLS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            from_address: env::var("LEADWIRE_FROM_ADDRESS")
                .unwrap_or_else(|_| "invites@leadwire.local".to_string()),
            from_name: env::var("LEADWIRE_FROM_NAME").unwrap_or_else(|_| "Leadwire".to_string()),
            tracking_base_url: env::var("LEADWIRE_TRACKING_BASE_URL")
                .unwrap_or_else(|_| "https://app.leadwire.local".to_string()),
        }
    }
}
