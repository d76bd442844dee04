//! # API Client
//!
//! Main HTTP client for backend communication.

use crate::core::config::{BackendSettings, REALTIME_CHANNEL};
use crate::core::error::{AppError, Result};
use crate::core::service::{AuthService, ConfigBackend};
use crate::services::api::realtime::{self, ConfigUpdate};
use async_channel::Receiver;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use shared::{AuthUser, ConfigRecord, ErrorResponse, RateTable, Session};
use std::time::Duration;

/// Overall bound for any single HTTP request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the configuration backend.
///
/// Holds one `reqwest::Client` (connection pool) and the access token of the
/// signed-in admin, if any. Safe to share behind an `Arc`.
pub struct SupabaseClient {
    pub(crate) client: Client,
    base_url: String,
    api_key: String,
    table: String,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    /// Create a client for the given backend.
    ///
    /// The client is configured with a 10 second timeout to prevent hangs.
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            table: settings.table.clone(),
            access_token: RwLock::new(None),
        })
    }

    /// REST endpoint of the configuration table.
    pub(crate) fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Auth endpoint, `path` without leading slash (e.g. `token`).
    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Bearer for REST calls: the admin's token when signed in, else the API key.
    pub(crate) fn bearer(&self) -> String {
        self.access_token
            .read()
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Attach `apikey` and `Authorization` headers.
    pub(crate) fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    /// Extract the backend's error message from a failed response.
    pub(crate) async fn error_message(response: Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => body
                .describe()
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            Err(_) => format!("HTTP {}", status.as_u16()),
        }
    }
}

#[async_trait::async_trait]
impl ConfigBackend for SupabaseClient {
    async fn ping(&self) -> Result<()> {
        crate::services::api::config_table::select_first(self, "id")
            .await
            .map(|_| ())
    }

    async fn config_row_id(&self) -> Result<Option<i64>> {
        crate::services::api::config_table::config_row_id(self).await
    }

    async fn fetch_rates(&self) -> Result<Option<RateTable>> {
        crate::services::api::config_table::fetch_rates(self).await
    }

    async fn fetch_logo(&self) -> Result<Option<String>> {
        crate::services::api::config_table::fetch_logo(self).await
    }

    async fn update_config(&self, id: i64, patch: &ConfigRecord) -> Result<()> {
        crate::services::api::config_table::update_config(self, id, patch).await
    }

    async fn insert_config(&self, record: &ConfigRecord) -> Result<()> {
        crate::services::api::config_table::insert_config(self, record).await
    }

    fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    fn subscribe_updates(&self) -> Option<Receiver<ConfigUpdate>> {
        let (tx, rx) = async_channel::unbounded();
        let url = realtime::realtime_url(&self.base_url, &self.api_key);
        let topic = realtime::topic(REALTIME_CHANNEL);
        let table = self.table.clone();
        let token = self.bearer();

        tokio::spawn(async move {
            realtime::run_subscription(url, topic, table, token, tx).await;
        });

        Some(rx)
    }
}

#[async_trait::async_trait]
impl AuthService for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        crate::services::api::auth::sign_in(self, email, password).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        crate::services::api::auth::refresh_session(self, refresh_token).await
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        crate::services::api::auth::current_user(self, access_token).await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<AuthUser> {
        crate::services::api::auth::update_password(self, access_token, new_password).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        crate::services::api::auth::sign_out(self, access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&BackendSettings {
            url: "https://project.example.co/".to_string(),
            api_key: "anon-key".to_string(),
            table: "istore_config".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.rest_url(), "https://project.example.co/rest/v1/istore_config");
        assert_eq!(client.auth_url("token"), "https://project.example.co/auth/v1/token");
    }

    #[test]
    fn test_bearer_prefers_access_token() {
        let client = client();
        assert_eq!(client.bearer(), "anon-key");
        client.set_access_token(Some("jwt".to_string()));
        assert_eq!(client.bearer(), "jwt");
        client.set_access_token(None);
        assert_eq!(client.bearer(), "anon-key");
    }
}
