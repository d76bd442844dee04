//! # Realtime Client for Configuration Updates
//!
//! Handles the websocket connection to the backend's realtime service and
//! forwards updates of the configuration row.
//!
//! The server speaks the Phoenix channel protocol: every frame is a JSON
//! object `{topic, event, payload, ref}`. The client joins one topic with a
//! `postgres_changes` filter and keeps it alive with heartbeats on the
//! `phoenix` topic.

use crate::services::logo;
use async_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::RateTable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

/// Maximum number of consecutive failed connection attempts before giving up
const MAX_CONNECTION_ATTEMPTS: u64 = 5;
const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Total configuration updates received since startup
pub static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// What an update does to the logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoChange {
    /// Column absent from the update
    Unchanged,
    /// Column null or empty
    Cleared,
    /// New data URI
    Set(String),
}

/// A configuration row update pushed by another client.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigUpdate {
    /// New rate table, when the record carries one
    pub rates: Option<RateTable>,
    pub logo: LogoChange,
}

/// Phoenix channel frame
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    msg_ref: Option<String>,
}

/// Websocket URL for the realtime service
pub fn realtime_url(base_url: &str, api_key: &str) -> String {
    base_url
        .trim_end_matches('/')
        .replace("http://", "ws://")
        .replace("https://", "wss://")
        + "/realtime/v1/websocket?apikey="
        + api_key
        + "&vsn=1.0.0"
}

/// Channel topic for a channel name.
pub fn topic(channel: &str) -> String {
    format!("realtime:{}", channel)
}

fn join_frame(topic: &str, table: &str, access_token: &str, msg_ref: u64) -> String {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "UPDATE", "schema": "public", "table": table }
                ]
            },
            "access_token": access_token
        },
        "ref": msg_ref.to_string(),
        "join_ref": msg_ref.to_string()
    })
    .to_string()
}

fn heartbeat_frame(msg_ref: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string()
    })
    .to_string()
}

/// Parse a text frame into a configuration update.
///
/// Returns `None` for frames on other topics, replies, system messages and
/// change events that are not `UPDATE`s.
pub fn parse_config_update(text: &str, topic: &str) -> Option<ConfigUpdate> {
    let frame: PhoenixMessage = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(
                error = %e,
                message_length = text.len(),
                "Failed to parse realtime frame - message may be malformed"
            );
            return None;
        }
    };

    if frame.topic != topic {
        return None;
    }

    match frame.event.as_str() {
        "postgres_changes" => {}
        "phx_reply" => {
            let status = frame.payload.get("status").and_then(Value::as_str).unwrap_or("");
            if status == "error" {
                warn!(msg_ref = ?frame.msg_ref, payload = %frame.payload, "Realtime join rejected");
            } else {
                debug!(msg_ref = ?frame.msg_ref, status = status, "Realtime reply");
            }
            return None;
        }
        other => {
            trace!(event = other, "Ignoring realtime event");
            return None;
        }
    }

    let data = frame.payload.get("data")?;
    if data.get("type").and_then(Value::as_str) != Some("UPDATE") {
        return None;
    }
    let record = data.get("record")?.as_object()?;

    let rates = match record.get("rates") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let (rates, rejected) = RateTable::parse_lossy(raw);
            for reason in &rejected {
                warn!(reason = %reason, "Dropped invalid rate entry from realtime update");
            }
            Some(rates)
        }
    };

    let logo = match record.get("logo") {
        None => LogoChange::Unchanged,
        Some(Value::String(s)) if !s.is_empty() => match logo::validate_data_uri(s) {
            Ok(_) => LogoChange::Set(s.clone()),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid logo from realtime update");
                LogoChange::Unchanged
            }
        },
        Some(_) => LogoChange::Cleared,
    };

    Some(ConfigUpdate { rates, logo })
}

/// Why a connected session ended.
enum SessionEnd {
    /// Server closed or the socket failed; reconnect
    Disconnected,
    /// Nobody listens any more; stop for good
    ReceiverGone,
}

/// Connect to the realtime service and forward updates until the receiver is dropped.
///
/// Handles:
/// - Channel join with a `postgres_changes` filter on the config table
/// - Heartbeats and ping/pong
/// - Automatic reconnection with exponential backoff, giving up after
///   [`MAX_CONNECTION_ATTEMPTS`] consecutive failures
pub async fn run_subscription(
    url: String,
    topic: String,
    table: String,
    access_token: String,
    tx: Sender<ConfigUpdate>,
) {
    let mut reconnect_delay = INITIAL_RECONNECT_DELAY;
    let mut failed_attempts = 0u64;

    loop {
        if tx.is_closed() {
            return;
        }

        match connect_async(&url).await {
            Ok((ws_stream, response)) => {
                info!(status = ?response.status(), topic = %topic, "Realtime connection established");
                failed_attempts = 0;
                reconnect_delay = INITIAL_RECONNECT_DELAY;

                match run_session(ws_stream, &topic, &table, &access_token, &tx).await {
                    SessionEnd::ReceiverGone => {
                        info!("Realtime receiver dropped, closing subscription");
                        return;
                    }
                    SessionEnd::Disconnected => {
                        warn!("Realtime connection lost, reconnecting...");
                    }
                }
            }
            Err(e) => {
                failed_attempts += 1;
                error!(
                    error = %e,
                    failed_attempts = failed_attempts,
                    max_attempts = MAX_CONNECTION_ATTEMPTS,
                    "Failed to connect to realtime service"
                );

                if failed_attempts >= MAX_CONNECTION_ATTEMPTS {
                    error!(
                        failed_attempts = failed_attempts,
                        "Maximum connection attempts reached. Realtime updates disabled."
                    );
                    return;
                }
            }
        }

        info!(delay_secs = reconnect_delay.as_secs(), "Reconnecting to realtime service");
        sleep(reconnect_delay).await;
        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
    }
}

async fn run_session(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    topic: &str,
    table: &str,
    access_token: &str,
    tx: &Sender<ConfigUpdate>,
) -> SessionEnd {
    let (mut write, mut read) = ws_stream.split();
    let mut msg_ref = 1u64;

    if let Err(e) = write
        .send(Message::Text(join_frame(topic, table, access_token, msg_ref)))
        .await
    {
        error!(error = %e, "Failed to send realtime join");
        return SessionEnd::Disconnected;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // First tick completes immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if tx.is_closed() {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::ReceiverGone;
                }
                msg_ref += 1;
                if let Err(e) = write.send(Message::Text(heartbeat_frame(msg_ref))).await {
                    error!(error = %e, "Failed to send realtime heartbeat");
                    return SessionEnd::Disconnected;
                }
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(update) = parse_config_update(&text, topic) {
                        let total = MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
                        info!(
                            has_rates = update.rates.is_some(),
                            logo_changed = update.logo != LogoChange::Unchanged,
                            total_messages = total,
                            "Configuration update received"
                        );
                        if tx.send(update).await.is_err() {
                            return SessionEnd::ReceiverGone;
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    trace!(data_len = data.len(), "Received ping, sending pong");
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        error!(error = %e, "Failed to send pong response");
                        return SessionEnd::Disconnected;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(
                        code = ?frame.as_ref().map(|f| f.code),
                        "Realtime connection closed by server"
                    );
                    return SessionEnd::Disconnected;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "Realtime read error");
                    return SessionEnd::Disconnected;
                }
                None => return SessionEnd::Disconnected,
            }
        }
    }
}
