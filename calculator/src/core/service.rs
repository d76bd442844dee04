//! # Service Traits
//!
//! Traits for dependency injection. The data-access layer
//! ([`crate::services::database::Database`]) talks to the backend only through
//! these, so tests can swap the HTTP client for an in-memory mock.

use crate::core::error::Result;
use crate::services::api::realtime::ConfigUpdate;
use async_channel::Receiver;
use async_trait::async_trait;
use shared::{AuthUser, ConfigRecord, RateTable, Session};

/// Configuration record storage.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Lightweight query proving the backend answers (`select=id&limit=1`).
    async fn ping(&self) -> Result<()>;

    /// Id of the configuration row, `None` when the table is empty.
    async fn config_row_id(&self) -> Result<Option<i64>>;

    /// Rate table of the configuration row, if the row and column are set.
    async fn fetch_rates(&self) -> Result<Option<RateTable>>;

    /// Logo column of the configuration row, if the row exists and it is non-null.
    async fn fetch_logo(&self) -> Result<Option<String>>;

    /// Patch the row with the given id. Only `Some` fields are sent.
    async fn update_config(&self, id: i64, patch: &ConfigRecord) -> Result<()>;

    /// Insert a new row.
    async fn insert_config(&self, record: &ConfigRecord) -> Result<()>;

    /// Token used for row-level security on subsequent requests (`None` = anonymous).
    fn set_access_token(&self, token: Option<String>);

    /// Start a realtime subscription to configuration updates.
    ///
    /// Returns `None` when realtime is unavailable for this backend.
    fn subscribe_updates(&self) -> Option<Receiver<ConfigUpdate>>;
}

/// Admin authentication.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Password grant.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    /// User owning `access_token`; fails when the token is no longer valid.
    async fn current_user(&self, access_token: &str) -> Result<AuthUser>;

    /// Change the password of the user owning `access_token`.
    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser>;

    /// Revoke the session server-side.
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// Everything the data-access layer needs from a remote backend.
pub trait Backend: ConfigBackend + AuthService {}

impl<T: ConfigBackend + AuthService> Backend for T {}
