//! Outbound email dispatch.
//!
//! The dispatcher is a black box behind the `Mailer` trait: send one message,
//! get back a provider message id or an error string. Per-row batch handling
//! turns the error string into a report entry; single-row operations map it
//! to `AppError::Dispatch`.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::mail::MailConfig;

/// Result of one dispatch attempt: provider message id, or a human-readable
/// error for the batch report.
pub type DispatchResult = std::result::Result<String, String>;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> DispatchResult;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> std::result::Result<Self, String> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> DispatchResult {
        let to_mailbox = to
            .parse()
            .map_err(|_| format!("Invalid recipient address: {}", to))?;

        let from = format!("{} <{}>", self.from_name, self.from_address);
        let from_mailbox = match from.parse() {
            Ok(mbox) => mbox,
            Err(_) => self
                .from_address
                .parse()
                .map_err(|_| "Invalid from address".to_string())?,
        };

        // SMTP gives no provider-side message id back; mint one so every
        // successful dispatch is still correlatable in the store.
        let message_id = format!("lw-{}", uuid::Uuid::new_v4());

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| format!("Failed to send email: {}", e))?;

        Ok(message_id)
    }
}
