//! Test helpers and utilities for unit and integration testing.
//!
//! This module provides common utilities for setting up test environments,
//! creating mock data, and testing database operations.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tokio::sync::Mutex;

use crate::migrations::Migrator;
use crate::models::{invite, user};
use crate::services::mailer::{DispatchResult, Mailer};
use crate::services::token::generate_token;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Use simple in-memory SQLite - each connection gets its own database
    let db_url = "sqlite::memory:";

    let db = Database::connect(db_url)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// One recorded dispatch attempt.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mailer that records every send instead of talking to SMTP. Addresses
/// added to the failure list are rejected with an error string so tests can
/// exercise partial batch failure.
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub failing: Mutex<Vec<String>>,
    counter: Mutex<u64>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            counter: Mutex::new(0),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make future sends to this address fail.
    pub async fn fail_for(&self, address: &str) {
        self.failing.lock().await.push(address.to_lowercase());
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn recipients(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|m| m.to.clone()).collect()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> DispatchResult {
        if self
            .failing
            .lock()
            .await
            .iter()
            .any(|f| f == &to.to_lowercase())
        {
            return Err("simulated provider rejection".to_string());
        }

        let mut counter = self.counter.lock().await;
        *counter += 1;
        let message_id = format!("test-msg-{}", *counter);
        drop(counter);

        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(message_id)
    }
}

/// Insert an invite row with sensible defaults and return the model.
pub async fn create_test_invite(db: &DatabaseConnection, email: &str) -> invite::Model {
    let row = invite::ActiveModel {
        email: Set(email.to_lowercase()),
        invite_token: Set(generate_token()),
        created_at: Set(chrono::Utc::now()),
        send_count: Set(0),
        ..Default::default()
    };
    row.insert(db).await.unwrap()
}

/// Insert a registered user row (the identity system's view of a signup).
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> user::Model {
    let row = user::ActiveModel {
        email: Set(email.to_lowercase()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.unwrap()
}
