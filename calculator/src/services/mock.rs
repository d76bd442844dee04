//! In-memory backend for unit tests.

use crate::core::error::{AppError, Result};
use crate::core::service::{AuthService, ConfigBackend};
use crate::services::api::ConfigUpdate;
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared::{AuthUser, ConfigRecord, RateTable, Session};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Backend holding at most one configuration row and one admin account.
pub struct MockBackend {
    row: Mutex<Option<ConfigRecord>>,
    password: Mutex<String>,
    tokens: Mutex<Vec<String>>,
    access_token: Mutex<Option<String>>,
    write_error: Mutex<Option<String>>,
    read_delay: Mutex<Option<Duration>>,
    fail_reads: AtomicBool,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    refreshes: AtomicUsize,
    issued: AtomicUsize,
    push: Mutex<Option<Sender<ConfigUpdate>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            row: Mutex::new(None),
            password: Mutex::new(Self::PASSWORD.to_string()),
            tokens: Mutex::new(Vec::new()),
            access_token: Mutex::new(None),
            write_error: Mutex::new(None),
            read_delay: Mutex::new(None),
            fail_reads: AtomicBool::new(false),
            inserts: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            issued: AtomicUsize::new(0),
            push: Mutex::new(None),
        }
    }
}

impl MockBackend {
    pub const EMAIL: &'static str = "admin@store.com";
    pub const PASSWORD: &'static str = "secret1";

    /// Backend with an existing, empty configuration row.
    pub fn with_row(id: i64) -> Self {
        let mock = Self::default();
        *mock.row.lock() = Some(ConfigRecord {
            id: Some(id),
            ..ConfigRecord::default()
        });
        mock
    }

    pub fn set_rates(&self, rates: RateTable) {
        if let Some(row) = self.row.lock().as_mut() {
            row.rates = Some(rates);
        }
    }

    pub fn set_logo(&self, logo: &str) {
        if let Some(row) = self.row.lock().as_mut() {
            row.logo = Some(logo.to_string());
        }
    }

    pub fn logo(&self) -> Option<String> {
        self.row.lock().as_ref().and_then(|row| row.logo.clone())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, message: &str) {
        *self.write_error.lock() = Some(message.to_string());
    }

    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock() = Some(delay);
    }

    pub fn revoke_all_tokens(&self) {
        self.tokens.lock().clear();
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.lock().clone()
    }

    pub fn password(&self) -> String {
        self.password.lock().clone()
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Deliver an update to the current subscriber, as the realtime service would.
    pub fn push(&self, update: ConfigUpdate) {
        if let Some(tx) = self.push.lock().as_ref() {
            let _ = tx.try_send(update);
        }
    }

    async fn before_read(&self) -> Result<()> {
        let delay = *self.read_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Api("Network error: connection refused".to_string()));
        }
        Ok(())
    }

    fn write_error(&self) -> Result<()> {
        match self.write_error.lock().clone() {
            Some(message) => Err(AppError::Api(message)),
            None => Ok(()),
        }
    }

    fn issue_session(&self, expires_in: i64) -> Session {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        let access_token = format!("access-{}", n);
        self.tokens.lock().push(access_token.clone());
        Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: None,
            refresh_token: format!("refresh-{}", n),
            user: self.user(),
        }
        .stamped(Utc::now())
    }

    fn user(&self) -> AuthUser {
        AuthUser {
            id: "admin-id".to_string(),
            email: Some(Self::EMAIL.to_string()),
            role: Some("authenticated".to_string()),
        }
    }

    fn check_token(&self, token: &str) -> Result<()> {
        if self.tokens.lock().iter().any(|t| t == token) {
            Ok(())
        } else {
            Err(AppError::Auth("invalid JWT".to_string()))
        }
    }
}

#[async_trait]
impl ConfigBackend for MockBackend {
    async fn ping(&self) -> Result<()> {
        self.before_read().await
    }

    async fn config_row_id(&self) -> Result<Option<i64>> {
        self.before_read().await?;
        Ok(self.row.lock().as_ref().and_then(|row| row.id))
    }

    async fn fetch_rates(&self) -> Result<Option<RateTable>> {
        self.before_read().await?;
        Ok(self.row.lock().as_ref().and_then(|row| row.rates.clone()))
    }

    async fn fetch_logo(&self) -> Result<Option<String>> {
        self.before_read().await?;
        Ok(self.logo())
    }

    async fn update_config(&self, id: i64, patch: &ConfigRecord) -> Result<()> {
        self.write_error()?;
        let mut row = self.row.lock();
        let Some(existing) = row.as_mut().filter(|row| row.id == Some(id)) else {
            return Err(AppError::Api(format!("No row with id {}", id)));
        };
        if let Some(rates) = &patch.rates {
            existing.rates = Some(rates.clone());
        }
        if let Some(logo) = &patch.logo {
            existing.logo = Some(logo.clone());
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_config(&self, record: &ConfigRecord) -> Result<()> {
        self.write_error()?;
        let mut inserted = record.clone();
        inserted.id = Some(1);
        *self.row.lock() = Some(inserted);
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_access_token(&self, token: Option<String>) {
        *self.access_token.lock() = token;
    }

    fn subscribe_updates(&self) -> Option<Receiver<ConfigUpdate>> {
        let (tx, rx) = async_channel::unbounded();
        *self.push.lock() = Some(tx);
        Some(rx)
    }
}

#[async_trait]
impl AuthService for MockBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if email != Self::EMAIL || password != *self.password.lock() {
            return Err(AppError::Auth("Invalid login credentials".to_string()));
        }
        Ok(self.issue_session(3600))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        if !refresh_token.starts_with("refresh-") {
            return Err(AppError::Auth("Invalid Refresh Token".to_string()));
        }
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.issue_session(3600))
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        self.before_read().await?;
        self.check_token(access_token)?;
        Ok(self.user())
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser> {
        self.check_token(access_token)?;
        *self.password.lock() = new_password.to_string();
        Ok(self.user())
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.check_token(access_token)?;
        self.tokens.lock().retain(|t| t != access_token);
        Ok(())
    }
}
