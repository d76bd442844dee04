//! # Application Events
//!
//! Event types for async task communication between background tasks and the app.

use crate::services::api::ConfigUpdate;
use shared::RateTable;

/// Async task results sent to the app
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Backend rates loaded (or cache fallback)
    RatesLoaded(RateTable),
    /// Backend logo loaded (or cache fallback)
    LogoLoaded(Option<String>),
    /// Connectivity checked
    ConnectionChecked(bool),
    /// Configuration row changed by another client
    RemoteUpdate(ConfigUpdate),
    /// Realtime subscription ended (gave up reconnecting)
    RealtimeClosed,
}
