//! # Async Tasks
//!
//! Background tasks feeding [`AppEvent`]s into the app channel.

use crate::app::events::AppEvent;
use crate::services::api::ConfigUpdate;
use crate::services::database::Database;
use async_channel::{Receiver, Sender};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Load rates, logo and connectivity concurrently and report each result.
pub(crate) fn load_remote_state(db: Arc<Database>, event_tx: Sender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = std::time::Instant::now();
        let (rates, logo, connected) = tokio::join!(db.get_rates(), db.get_logo(), db.check_connection());

        tracing::info!(
            connected,
            has_logo = logo.is_some(),
            duration_ms = start.elapsed().as_millis(),
            "Initial state loaded"
        );

        for event in [
            AppEvent::RatesLoaded(rates),
            AppEvent::LogoLoaded(logo),
            AppEvent::ConnectionChecked(connected),
        ] {
            if event_tx.send(event).await.is_err() {
                tracing::debug!("App event channel closed during initial load");
                return;
            }
        }
    })
}

/// Forward realtime updates into the app channel until either side closes.
pub(crate) fn forward_updates(updates: Receiver<ConfigUpdate>, event_tx: Sender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            tracing::debug!(has_rates = update.rates.is_some(), "Forwarding realtime update");
            if event_tx.send(AppEvent::RemoteUpdate(update)).await.is_err() {
                return;
            }
        }
        tracing::info!("Realtime subscription ended");
        let _ = event_tx.send(AppEvent::RealtimeClosed).await;
    })
}
