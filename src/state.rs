use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::mailer::Mailer;

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Shared mail dispatcher handle. Behind a trait object so tests can swap
/// in a recording mailer.
pub type SharedMailer = Arc<dyn Mailer>;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub mailer: SharedMailer,
}

impl AppState {
    pub fn new(db: DbConn, mailer: SharedMailer) -> Self {
        Self { db, mailer }
    }
}
