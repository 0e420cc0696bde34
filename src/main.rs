use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadwire::config::CONFIG;
use leadwire::services::mailer::SmtpMailer;
use leadwire::state::AppState;
use leadwire::{db, endpoints};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "leadwire={},tower_http=info",
                    CONFIG.log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting leadwire v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection and run migrations
    let db = db::connect().await?;
    tracing::info!("Database connection established");

    // Outbound mail transport
    let mailer = SmtpMailer::from_config(&CONFIG.mail)
        .map_err(|e| anyhow::anyhow!("Mailer init failed: {}", e))?;
    tracing::info!(host = %CONFIG.mail.smtp_host, "SMTP transport ready");

    let state = AppState::new(db, Arc::new(mailer));
    let app = endpoints::create_router(state);

    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
