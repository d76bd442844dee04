//! # Configuration Table Endpoints
//!
//! PostgREST-style access to the single configuration row. Reads select one
//! column with `limit=1` and take the first row; writes send only the changed
//! column with `Prefer: return=minimal`.

use super::client::SupabaseClient;
use crate::core::error::{AppError, Result};
use serde_json::Value;
use shared::{ConfigRecord, RateTable};

/// First row of the table restricted to `columns`, `None` when the table is empty.
#[tracing::instrument(skip(client), fields(table = %client.table()))]
pub async fn select_first(client: &SupabaseClient, columns: &str) -> Result<Option<Value>> {
    let start = std::time::Instant::now();

    let response = client
        .authorize(client.client.get(client.rest_url()), &client.bearer())
        .query(&[("select", columns), ("limit", "1")])
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Config select network error");
            AppError::Api(format!("Network error: {}", e))
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = SupabaseClient::error_message(response).await;
        tracing::warn!(status = status.as_u16(), error = %message, "Config select failed");
        // Rejected bearer (e.g. an expired session JWT)
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(message));
        }
        return Err(AppError::Api(message));
    }

    let rows = response
        .json::<Vec<Value>>()
        .await
        .map_err(|e| AppError::Api(format!("Failed to parse response: {}", e)))?;

    tracing::debug!(
        rows = rows.len(),
        duration_ms = start.elapsed().as_millis(),
        "Config select completed"
    );
    Ok(rows.into_iter().next())
}

pub async fn config_row_id(client: &SupabaseClient) -> Result<Option<i64>> {
    let row = select_first(client, "id").await?;
    Ok(row.and_then(|r| r.get("id").and_then(Value::as_i64)))
}

pub async fn fetch_rates(client: &SupabaseClient) -> Result<Option<RateTable>> {
    let Some(row) = select_first(client, "rates").await? else {
        return Ok(None);
    };

    match row.get("rates") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => {
            let (rates, rejected) = RateTable::parse_lossy(raw);
            for reason in &rejected {
                tracing::warn!(reason = %reason, "Dropped invalid rate entry from backend");
            }
            Ok(Some(rates))
        }
    }
}

pub async fn fetch_logo(client: &SupabaseClient) -> Result<Option<String>> {
    let row = select_first(client, "logo").await?;
    Ok(row.and_then(|r| r.get("logo").and_then(Value::as_str).map(str::to_string)))
}

#[tracing::instrument(skip(client, patch), fields(table = %client.table()))]
pub async fn update_config(client: &SupabaseClient, id: i64, patch: &ConfigRecord) -> Result<()> {
    let response = client
        .authorize(client.client.patch(client.rest_url()), &client.bearer())
        .query(&[("id", format!("eq.{}", id))])
        .header("Prefer", "return=minimal")
        .json(patch)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        tracing::info!("Configuration row updated");
        Ok(())
    } else {
        let message = SupabaseClient::error_message(response).await;
        tracing::warn!(status = status.as_u16(), error = %message, "Configuration update failed");
        Err(AppError::Api(message))
    }
}

#[tracing::instrument(skip(client, record), fields(table = %client.table()))]
pub async fn insert_config(client: &SupabaseClient, record: &ConfigRecord) -> Result<()> {
    let response = client
        .authorize(client.client.post(client.rest_url()), &client.bearer())
        .header("Prefer", "return=minimal")
        .json(record)
        .send()
        .await
        .map_err(|e| AppError::Api(format!("Network error: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        tracing::info!("Configuration row inserted");
        Ok(())
    } else {
        let message = SupabaseClient::error_message(response).await;
        tracing::warn!(status = status.as_u16(), error = %message, "Configuration insert failed");
        Err(AppError::Api(message))
    }
}
