//! # Data Access
//!
//! Single entry point for rates, logo and admin session. Every value is
//! mirrored to the [`LocalStore`] so the calculator keeps working on
//! last-known values when the backend is missing, slow or failing.
//!
//! ## Degradation Rules
//!
//! | Situation | Reads | Saves |
//! |-----------|-------|-------|
//! | No backend configured | cached values | cached only, reported as `Offline` |
//! | Backend error / timeout | cached values | cached, reported with the error |
//! | Backend OK | backend values (cached on the way) | cached and remote |
//!
//! Reads are bounded by the configured timeout. The only retry is a single
//! anonymous re-read when the backend rejects the session token.

use crate::core::config::Settings;
use crate::core::error::{AppError, Result};
use crate::core::service::Backend;
use crate::services::api::{ConfigUpdate, LogoChange, SupabaseClient};
use crate::services::cache::{keys, LocalStore};
use crate::services::logo;
use async_channel::Receiver;
use chrono::Utc;
use shared::{AuthUser, ConfigRecord, RateTable, SaveOutcome, Session};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Data-access facade over an optional backend and the local store.
pub struct Database {
    backend: Option<Arc<dyn Backend>>,
    store: Arc<LocalStore>,
    timeout: Duration,
}

impl Database {
    pub fn new(backend: Option<Arc<dyn Backend>>, store: Arc<LocalStore>, timeout: Duration) -> Self {
        let db = Self {
            backend,
            store,
            timeout,
        };
        db.restore_session_token();
        db
    }

    /// Build from settings: HTTP backend when configured, file store in the cache dir.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let backend: Option<Arc<dyn Backend>> = match &settings.backend {
            Some(backend_settings) => Some(Arc::new(SupabaseClient::new(backend_settings)?)),
            None => {
                tracing::warn!("No backend configured - running in offline mode");
                None
            }
        };
        let store = Arc::new(LocalStore::open(&settings.cache_dir));
        Ok(Self::new(backend, store, settings.timeout))
    }

    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Run a backend call under the read timeout.
    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Timed read that retries once with the API key when the session token is rejected.
    async fn read_with_fallback<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.with_timeout(call()).await {
            Err(AppError::Auth(msg)) => {
                tracing::info!(error = %msg, "Session token rejected, reading with the API key");
                if let Some(backend) = &self.backend {
                    backend.set_access_token(None);
                }
                self.with_timeout(call()).await
            }
            other => other,
        }
    }

    // ========== Session ==========

    /// Session persisted by a previous `login`, if any.
    pub fn stored_session(&self) -> Option<Session> {
        let raw = self.store.get_item(keys::SESSION)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored session");
                let _ = self.store.remove_item(keys::SESSION);
                None
            }
        }
    }

    fn persist_session(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(raw) => {
                if let Err(e) = self.store.set_item(keys::SESSION, &raw) {
                    tracing::warn!(error = %e, "Failed to persist session");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session"),
        }
        if let Some(backend) = &self.backend {
            backend.set_access_token(Some(session.access_token.clone()));
        }
    }

    fn clear_session(&self) {
        if let Err(e) = self.store.remove_item(keys::SESSION) {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        if let Some(backend) = &self.backend {
            backend.set_access_token(None);
        }
    }

    /// Install the stored token for REST calls. An expired one stays on disk
    /// for the admin path to refresh; reads go out with the API key meanwhile.
    fn restore_session_token(&self) {
        if let (Some(backend), Some(session)) = (&self.backend, self.stored_session()) {
            if session.is_expired(Utc::now()) {
                tracing::debug!("Stored session expired, reading anonymously until refreshed");
                return;
            }
            backend.set_access_token(Some(session.access_token));
        }
    }

    /// Sign in as admin and persist the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let backend = self.backend.as_ref().ok_or(AppError::Offline)?;
        let session = backend.sign_in(email, password).await?;
        self.persist_session(&session);
        Ok(session.user)
    }

    /// Sign out. The local session is cleared even when the backend call fails.
    pub async fn logout(&self) {
        if let (Some(backend), Some(session)) = (&self.backend, self.stored_session()) {
            if let Err(e) = self.with_timeout(backend.sign_out(&session.access_token)).await {
                tracing::warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
            }
        }
        self.clear_session();
    }

    /// Signed-in user, refreshing an expired session when possible.
    ///
    /// `None` when offline, signed out, or the backend cannot confirm the session.
    pub async fn authenticated_user(&self) -> Option<AuthUser> {
        let backend = self.backend.as_ref()?;
        let mut session = self.stored_session()?;

        if session.is_expired(Utc::now()) {
            match self.with_timeout(backend.refresh_session(&session.refresh_token)).await {
                Ok(fresh) => {
                    self.persist_session(&fresh);
                    session = fresh;
                }
                Err(AppError::Auth(msg)) => {
                    tracing::info!(error = %msg, "Session refresh rejected, signing out");
                    self.clear_session();
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session refresh unavailable");
                    return None;
                }
            }
        }

        match self.with_timeout(backend.current_user(&session.access_token)).await {
            Ok(user) => Some(user),
            Err(AppError::Auth(msg)) => {
                tracing::info!(error = %msg, "Stored session rejected, signing out");
                self.clear_session();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.authenticated_user().await.is_some()
    }

    /// Change the admin password. `Ok(false)` when offline.
    pub async fn update_password(&self, new_password: &str) -> Result<bool> {
        let Some(backend) = &self.backend else {
            return Ok(false);
        };
        let session = self
            .stored_session()
            .ok_or_else(|| AppError::Auth("Not signed in".to_string()))?;
        backend.update_password(&session.access_token, new_password).await?;
        Ok(true)
    }

    // ========== Connectivity ==========

    pub async fn check_connection(&self) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };
        match self.read_with_fallback(|| backend.ping()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Backend connection check failed");
                false
            }
        }
    }

    // ========== Rates ==========

    /// Cached rates, or the defaults when nothing usable is cached.
    pub fn get_cached_rates(&self) -> RateTable {
        let Some(raw) = self.store.get_item(keys::RATES) else {
            return RateTable::defaults();
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => {
                let (rates, rejected) = RateTable::parse_lossy(&value);
                for reason in &rejected {
                    tracing::warn!(reason = %reason, "Dropped invalid cached rate entry");
                }
                rates
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cached rates unreadable, using defaults");
                RateTable::defaults()
            }
        }
    }

    fn cache_rates(&self, rates: &RateTable) {
        let result = serde_json::to_string(rates)
            .map_err(|e| AppError::Cache(e.to_string()))
            .and_then(|raw| self.store.set_item(keys::RATES, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to cache rates");
        }
    }

    /// Backend rates when reachable (cached on the way), else cached rates.
    pub async fn get_rates(&self) -> RateTable {
        let cached = self.get_cached_rates();
        let Some(backend) = &self.backend else {
            return cached;
        };

        match self.read_with_fallback(|| backend.fetch_rates()).await {
            Ok(Some(rates)) => {
                self.cache_rates(&rates);
                rates
            }
            Ok(None) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "Using cached rates");
                cached
            }
        }
    }

    /// Cache the table, then update the remote row (inserting it when absent).
    pub async fn save_rates(&self, rates: &RateTable) -> SaveOutcome {
        self.cache_rates(rates);
        self.save_record(ConfigRecord::with_rates(rates.clone())).await
    }

    async fn save_record(&self, record: ConfigRecord) -> SaveOutcome {
        let Some(backend) = &self.backend else {
            return SaveOutcome::failed(AppError::Offline.message());
        };

        let row_id = match self.with_timeout(backend.config_row_id()).await {
            Ok(id) => id,
            Err(e) => return SaveOutcome::failed(e.message()),
        };

        let result = match row_id {
            Some(id) => backend.update_config(id, &record).await,
            None => {
                tracing::info!("No configuration row yet, inserting one");
                backend.insert_config(&record).await
            }
        };

        match result {
            Ok(()) => SaveOutcome::ok(),
            Err(e) => SaveOutcome::failed(e.message()),
        }
    }

    // ========== Logo ==========

    pub fn get_cached_logo(&self) -> Option<String> {
        self.store.get_item(keys::LOGO)
    }

    /// Backend logo when set (cached on the way), else the cached one.
    pub async fn get_logo(&self) -> Option<String> {
        let local = self.get_cached_logo();
        let Some(backend) = &self.backend else {
            return local;
        };

        match self.read_with_fallback(|| backend.fetch_logo()).await {
            Ok(Some(remote)) if !remote.is_empty() => match logo::validate_data_uri(&remote) {
                Ok(_) => {
                    if let Err(e) = self.store.set_item(keys::LOGO, &remote) {
                        tracing::warn!(error = %e, "Failed to cache logo");
                    }
                    Some(remote)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid logo from backend");
                    local
                }
            },
            Ok(_) => local,
            Err(e) => {
                tracing::warn!(error = %e, "Using cached logo");
                local
            }
        }
    }

    /// Validate, cache, then store the logo remotely.
    pub async fn save_logo(&self, data_uri: &str) -> SaveOutcome {
        if let Err(e) = logo::validate_data_uri(data_uri) {
            return SaveOutcome::failed(e.message());
        }
        if let Err(e) = self.store.set_item(keys::LOGO, data_uri) {
            tracing::warn!(error = %e, "Failed to cache logo");
        }
        self.save_record(ConfigRecord::with_logo(data_uri)).await
    }

    /// Clear the logo locally and on the existing remote row.
    pub async fn remove_logo(&self) -> bool {
        if let Err(e) = self.store.remove_item(keys::LOGO) {
            tracing::warn!(error = %e, "Failed to remove cached logo");
        }
        let Some(backend) = &self.backend else {
            return true;
        };

        let row_id = match self.with_timeout(backend.config_row_id()).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot locate configuration row");
                return false;
            }
        };

        match row_id {
            Some(id) => match backend.update_config(id, &ConfigRecord::with_logo("")).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to clear remote logo");
                    false
                }
            },
            None => true,
        }
    }

    // ========== Realtime ==========

    /// Start receiving configuration updates. `None` when offline.
    pub fn subscribe(&self) -> Option<Receiver<ConfigUpdate>> {
        self.backend.as_ref()?.subscribe_updates()
    }

    /// Mirror a pushed update into the local store.
    pub fn apply_update(&self, update: &ConfigUpdate) {
        if let Some(rates) = &update.rates {
            self.cache_rates(rates);
        }
        let result = match &update.logo {
            LogoChange::Unchanged => Ok(()),
            LogoChange::Set(uri) => match logo::validate_data_uri(uri) {
                Ok(_) => self.store.set_item(keys::LOGO, uri),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid pushed logo");
                    Ok(())
                }
            },
            LogoChange::Cleared => self.store.remove_item(keys::LOGO),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to cache pushed logo");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::service::ConfigBackend;
    use crate::services::mock::MockBackend;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn offline_db() -> Database {
        Database::new(None, Arc::new(LocalStore::in_memory()), TIMEOUT)
    }

    fn online_db(mock: Arc<MockBackend>) -> Database {
        Database::new(Some(mock), Arc::new(LocalStore::in_memory()), TIMEOUT)
    }

    fn sample_rates() -> RateTable {
        [(1, 0.0), (2, 3.5), (12, 11.0), (21, 25.0)].into_iter().collect()
    }

    // ========== Offline Mode ==========

    #[tokio::test]
    async fn test_offline_returns_defaults_without_cache() {
        let db = offline_db();
        assert!(!db.is_online());
        assert_eq!(db.get_rates().await, RateTable::defaults());
        assert_eq!(db.get_logo().await, None);
        assert!(!db.check_connection().await);
        assert!(!db.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_offline_returns_cached_values() {
        let db = offline_db();
        let outcome = db.save_rates(&sample_rates()).await;
        assert_eq!(outcome, SaveOutcome::failed("Offline"));

        db.store().set_item(keys::LOGO, "data:image/png;base64,AAAA").unwrap();

        assert_eq!(db.get_rates().await, sample_rates());
        assert_eq!(db.get_logo().await.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[tokio::test]
    async fn test_offline_login_and_password() {
        let db = offline_db();
        assert!(matches!(db.login("a@b.com", "secret").await, Err(AppError::Offline)));
        assert!(!db.update_password("another").await.unwrap());
        assert!(db.remove_logo().await);
    }

    #[test]
    fn test_corrupt_cached_rates_fall_back_to_defaults() {
        let db = offline_db();
        db.store().set_item(keys::RATES, "][").unwrap();
        assert_eq!(db.get_cached_rates(), RateTable::defaults());
    }

    // ========== Rates ==========

    #[tokio::test]
    async fn test_save_then_reload_round_trip() {
        let mock = Arc::new(MockBackend::with_row(1));
        let db = online_db(mock.clone());

        assert!(db.save_rates(&sample_rates()).await.success);
        assert_eq!(mock.updates(), 1);
        assert_eq!(mock.inserts(), 0);

        // Fresh client with an empty cache sees the same mapping
        let other = online_db(mock);
        assert_eq!(other.get_rates().await, sample_rates());
        assert_eq!(other.get_cached_rates(), sample_rates());
    }

    #[tokio::test]
    async fn test_save_inserts_when_no_row() {
        let mock = Arc::new(MockBackend::default());
        let db = online_db(mock.clone());

        assert!(db.save_rates(&sample_rates()).await.success);
        assert_eq!(mock.inserts(), 1);
        assert_eq!(mock.updates(), 0);
        assert_eq!(db.get_rates().await, sample_rates());
    }

    #[tokio::test]
    async fn test_save_reports_backend_error_but_keeps_cache() {
        let mock = Arc::new(MockBackend::with_row(1));
        mock.fail_writes("new row violates row-level security policy");
        let db = online_db(mock);

        let outcome = db.save_rates(&sample_rates()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("new row violates row-level security policy"));
        assert_eq!(db.get_cached_rates(), sample_rates());
    }

    #[tokio::test]
    async fn test_read_failure_falls_back_to_cache() {
        let mock = Arc::new(MockBackend::with_row(1));
        let db = online_db(mock.clone());
        db.store().set_item(keys::RATES, r#"{"3":9.0}"#).unwrap();

        mock.fail_reads(true);
        assert_eq!(db.get_rates().await.rate(3), 9.0);
        assert!(!db.check_connection().await);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_to_cache() {
        let mock = Arc::new(MockBackend::with_row(1));
        mock.set_rates(sample_rates());
        mock.delay_reads(Duration::from_millis(2000));
        let db = online_db(mock);

        let started = std::time::Instant::now();
        assert_eq!(db.get_rates().await, RateTable::defaults());
        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_row_lookup_failure_does_not_insert() {
        let mock = Arc::new(MockBackend::with_row(1));
        mock.fail_reads(true);
        let db = online_db(mock.clone());

        let outcome = db.save_rates(&sample_rates()).await;
        assert!(!outcome.success);
        assert_eq!(mock.inserts(), 0);
    }

    // ========== Logo ==========

    #[tokio::test]
    async fn test_logo_save_and_remove() {
        let mock = Arc::new(MockBackend::with_row(1));
        let db = online_db(mock.clone());
        let uri = "data:image/png;base64,iVBORw0KGgo=";

        assert!(db.save_logo(uri).await.success);
        assert_eq!(db.get_cached_logo().as_deref(), Some(uri));
        assert_eq!(mock.logo().as_deref(), Some(uri));

        assert!(db.remove_logo().await);
        assert_eq!(db.get_cached_logo(), None);
        assert_eq!(mock.logo().as_deref(), Some(""));
        // Empty remote logo falls back to the (now empty) cache
        assert_eq!(db.get_logo().await, None);
    }

    #[tokio::test]
    async fn test_save_logo_rejects_invalid_data_uri() {
        let mock = Arc::new(MockBackend::with_row(1));
        let db = online_db(mock.clone());

        let outcome = db.save_logo("not-an-image").await;
        assert!(!outcome.success);
        assert_eq!(db.get_cached_logo(), None);
        assert_eq!(mock.updates(), 0);
    }

    #[tokio::test]
    async fn test_invalid_remote_logo_is_ignored() {
        let mock = Arc::new(MockBackend::with_row(1));
        mock.set_logo("garbage");
        let db = online_db(mock);
        db.store().set_item(keys::LOGO, "data:image/gif;base64,R0lGOD").unwrap();

        assert_eq!(db.get_logo().await.as_deref(), Some("data:image/gif;base64,R0lGOD"));
    }

    // ========== Session ==========

    #[tokio::test]
    async fn test_login_persists_session_and_token() {
        let mock = Arc::new(MockBackend::with_row(1));
        let store = Arc::new(LocalStore::in_memory());
        let db = Database::new(Some(mock.clone()), store.clone(), TIMEOUT);

        let user = db.login(MockBackend::EMAIL, MockBackend::PASSWORD).await.unwrap();
        assert_eq!(user.email.as_deref(), Some(MockBackend::EMAIL));
        assert!(db.is_authenticated().await);
        assert!(mock.access_token().is_some());

        // A second process sharing the store restores the token
        mock.set_access_token(None);
        let again = Database::new(Some(mock.clone()), store, TIMEOUT);
        assert!(mock.access_token().is_some());
        assert!(again.is_authenticated().await);

        again.logout().await;
        assert!(again.stored_session().is_none());
        assert!(mock.access_token().is_none());
        assert!(!again.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_expired_stored_session_is_not_restored() {
        let mock = Arc::new(MockBackend::default());
        let store = Arc::new(LocalStore::in_memory());
        let db = Database::new(Some(mock.clone()), store.clone(), TIMEOUT);
        db.login(MockBackend::EMAIL, MockBackend::PASSWORD).await.unwrap();

        let mut session = db.stored_session().unwrap();
        session.expires_at = Some(1000);
        store.set_item(keys::SESSION, &serde_json::to_string(&session).unwrap()).unwrap();

        mock.set_access_token(None);
        let reader = Database::new(Some(mock.clone()), store, TIMEOUT);
        assert!(mock.access_token().is_none());
        // Still on disk for the admin path to refresh
        assert!(reader.stored_session().is_some());

        assert!(reader.is_authenticated().await);
        assert!(mock.access_token().is_some());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let db = online_db(Arc::new(MockBackend::default()));
        let err = db.login(MockBackend::EMAIL, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert!(db.stored_session().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() {
        let mock = Arc::new(MockBackend::default());
        let db = online_db(mock.clone());
        db.login(MockBackend::EMAIL, MockBackend::PASSWORD).await.unwrap();

        let mut session = db.stored_session().unwrap();
        session.expires_at = Some(Utc::now().timestamp() - 60);
        db.store().set_item(keys::SESSION, &serde_json::to_string(&session).unwrap()).unwrap();

        assert!(db.is_authenticated().await);
        assert_eq!(mock.refreshes(), 1);
        let fresh = db.stored_session().unwrap();
        assert!(!fresh.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_revoked_session_is_cleared() {
        let mock = Arc::new(MockBackend::default());
        let db = online_db(mock.clone());
        db.login(MockBackend::EMAIL, MockBackend::PASSWORD).await.unwrap();

        mock.revoke_all_tokens();
        assert!(!db.is_authenticated().await);
        assert!(db.stored_session().is_none());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let mock = Arc::new(MockBackend::default());
        let db = online_db(mock.clone());
        assert!(matches!(db.update_password("abcdef").await, Err(AppError::Auth(_))));

        db.login(MockBackend::EMAIL, MockBackend::PASSWORD).await.unwrap();
        assert!(db.update_password("abcdef").await.unwrap());
        assert_eq!(mock.password(), "abcdef");
    }

    // ========== Realtime ==========

    #[test]
    fn test_apply_update_mirrors_cache() {
        let db = offline_db();
        db.apply_update(&ConfigUpdate {
            rates: Some(sample_rates()),
            logo: LogoChange::Set("data:image/png;base64,AAAA".to_string()),
        });
        assert_eq!(db.get_cached_rates(), sample_rates());
        assert!(db.get_cached_logo().is_some());

        db.apply_update(&ConfigUpdate {
            rates: None,
            logo: LogoChange::Cleared,
        });
        assert_eq!(db.get_cached_rates(), sample_rates());
        assert_eq!(db.get_cached_logo(), None);
    }

    #[test]
    fn test_apply_update_skips_invalid_logo() {
        let db = offline_db();
        db.store().set_item(keys::LOGO, "data:image/png;base64,AAAA").unwrap();
        db.apply_update(&ConfigUpdate {
            rates: None,
            logo: LogoChange::Set("garbage".to_string()),
        });
        assert_eq!(db.get_cached_logo().as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_offline_has_no_subscription() {
        assert!(offline_db().subscribe().is_none());
    }
}
