//! # Authentication Endpoints
//!
//! Handles admin authentication (password sign-in, refresh, user lookup,
//! password change, sign-out).

use super::client::SupabaseClient;
use crate::core::error::{AppError, Result};
use chrono::Utc;
use reqwest::Response;
use shared::{AuthUser, PasswordGrantRequest, RefreshGrantRequest, Session, UpdateUserRequest};

/// Sign in with email and password.
#[tracing::instrument(skip(client, password), fields(email = %email))]
pub async fn sign_in(client: &SupabaseClient, email: &str, password: &str) -> Result<Session> {
    tracing::info!("Attempting login");
    let start = std::time::Instant::now();

    let request = PasswordGrantRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    let response = client
        .authorize(client.client.post(client.auth_url("token")), client.api_key())
        .query(&[("grant_type", "password")])
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Login network error");
            AppError::Api(format!("Network error: {}", e))
        })?;

    let status = response.status();
    let result = session_from(response).await;

    match &result {
        Ok(_) => tracing::info!(duration_ms = start.elapsed().as_millis(), "Login successful"),
        Err(e) => tracing::warn!(
            status = status.as_u16(),
            error = %e,
            duration_ms = start.elapsed().as_millis(),
            "Login failed"
        ),
    }
    result
}

/// Exchange a refresh token for a fresh session.
#[tracing::instrument(skip_all)]
pub async fn refresh_session(client: &SupabaseClient, refresh_token: &str) -> Result<Session> {
    let request = RefreshGrantRequest {
        refresh_token: refresh_token.to_string(),
    };

    let response = client
        .authorize(client.client.post(client.auth_url("token")), client.api_key())
        .query(&[("grant_type", "refresh_token")])
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    let result = session_from(response).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Session refresh failed");
    }
    result
}

/// User owning the given access token.
pub async fn current_user(client: &SupabaseClient, access_token: &str) -> Result<AuthUser> {
    let response = client
        .authorize(client.client.get(client.auth_url("user")), access_token)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    user_from(response).await
}

/// Change the signed-in user's password.
#[tracing::instrument(skip_all)]
pub async fn update_password(
    client: &SupabaseClient,
    access_token: &str,
    new_password: &str,
) -> Result<AuthUser> {
    let request = UpdateUserRequest {
        password: new_password.to_string(),
    };

    let response = client
        .authorize(client.client.put(client.auth_url("user")), access_token)
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    let result = user_from(response).await;
    match &result {
        Ok(_) => tracing::info!("Password updated"),
        Err(e) => tracing::warn!(error = %e, "Password update failed"),
    }
    result
}

/// Revoke the session server-side.
pub async fn sign_out(client: &SupabaseClient, access_token: &str) -> Result<()> {
    let response = client
        .authorize(client.client.post(client.auth_url("logout")), access_token)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    if response.status().is_success() {
        tracing::info!("Logged out");
        Ok(())
    } else {
        Err(rejection(response).await)
    }
}

async fn session_from(response: Response) -> Result<Session> {
    if response.status().is_success() {
        response
            .json::<Session>()
            .await
            .map(|session| session.stamped(Utc::now()))
            .map_err(|e| AppError::Api(format!("Failed to parse response: {}", e)))
    } else {
        Err(rejection(response).await)
    }
}

async fn user_from(response: Response) -> Result<AuthUser> {
    if response.status().is_success() {
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| AppError::Api(format!("Failed to parse response: {}", e)))
    } else {
        Err(rejection(response).await)
    }
}

/// 4xx means the credentials or token were refused; anything else is a backend fault.
async fn rejection(response: Response) -> AppError {
    let client_error = response.status().is_client_error();
    let message = SupabaseClient::error_message(response).await;
    if client_error {
        AppError::Auth(message)
    } else {
        AppError::Api(message)
    }
}
