//! # Application Orchestrator
//!
//! The [`App`] struct coordinates the data-access layer, background tasks and
//! application state. The command line drives it; nothing here prints.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  App (orchestrator)                                      │
//! │  - sync()          - concurrent initial load             │
//! │  - on_tick()       - drains pending events               │
//! │  - handle_event()  - applies results to state            │
//! │  - save_rates() / set_logo() / change_password() - admin │
//! └────────────┬─────────────────────────────────────────────┘
//!              │
//! ┌────────────▼─────────────────────────────────────────────┐
//! │  State: Arc<RwLock<AppState>>                            │
//! │  - locks held briefly, never across .await               │
//! └──────────────────────────────────────────────────────────┘
//!              ▲ async_channel (unbounded)
//! ┌────────────┴─────────────────────────────────────────────┐
//! │  Tasks (Tokio)                                           │
//! │  - load_remote_state() - rates + logo + connectivity     │
//! │  - forward_updates()   - realtime → AppEvent             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update Semantics
//!
//! State starts from cached values, is replaced by backend values once
//! loaded, and then by realtime updates as they arrive. Every update
//! overwrites the previous one (last write wins).
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use calculator::app::App;
//! use calculator::core::config::Settings;
//! use calculator::services::database::Database;
//! use std::sync::Arc;
//!
//! # async fn run() -> calculator::core::error::Result<()> {
//! let db = Arc::new(Database::from_settings(&Settings::from_env()?)?);
//! let app = App::new(db);
//! app.sync().await;
//! let plan = app.set_inputs("1.500,00", "")?;
//! assert_eq!(plan.rows.len(), 21);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod calculator;
mod events;
mod state;
mod tasks;

pub use admin::StatusMessage;
pub use events::AppEvent;
pub use state::*;

use crate::core::error::{AppError, Result};
use crate::services::api::LogoChange;
use crate::services::database::Database;
use crate::services::logo;
use async_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use shared::{AuthUser, InstallmentPlan};
use std::path::Path;
use std::sync::Arc;

/// Main application orchestrator.
pub struct App {
    /// Shared state. Hold locks briefly and never across `.await`.
    pub state: Arc<RwLock<AppState>>,

    /// Receiver for background task results, drained by [`App::on_tick`].
    pub event_rx: Receiver<AppEvent>,

    event_tx: Sender<AppEvent>,

    db: Arc<Database>,
}

impl App {
    /// Create the app from cached values. Nothing touches the network yet.
    pub fn new(db: Arc<Database>) -> Self {
        let state = AppState::new(db.get_cached_rates(), db.get_cached_logo(), db.is_online());
        let (event_tx, event_rx) = unbounded();

        tracing::debug!(online = state.online, "App state initialized from cache");

        Self {
            state: Arc::new(RwLock::new(state)),
            event_rx,
            event_tx,
            db,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Sender for feeding events from outside tasks.
    pub fn event_tx(&self) -> Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Load rates, logo and connectivity (concurrently, each under the read
    /// timeout) and apply the results.
    pub async fn sync(&self) {
        let handle = tasks::load_remote_state(Arc::clone(&self.db), self.event_tx.clone());
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Initial load task failed");
        }
        self.on_tick();
    }

    /// Start forwarding realtime updates. `false` when offline.
    pub fn start_realtime(&self) -> bool {
        let Some(updates) = self.db.subscribe() else {
            tracing::info!("Realtime unavailable (offline)");
            return false;
        };
        tasks::forward_updates(updates, self.event_tx.clone());
        self.state.write().realtime_active = true;
        true
    }

    /// Apply every pending event without waiting. Returns how many were handled.
    pub fn on_tick(&self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            processed += 1;
        }
        if processed > 0 {
            tracing::debug!(events_processed = processed, "Processed app events");
        }
        processed
    }

    /// Wait for the next event. `None` once every sender is gone.
    pub async fn next_event(&self) -> Option<AppEvent> {
        self.event_rx.recv().await.ok()
    }

    /// Apply one event to state.
    pub fn handle_event(&self, event: AppEvent) {
        match event {
            AppEvent::RatesLoaded(rates) => {
                let mut state = self.state.write();
                state.rates = rates;
                state.recalculate();
            }
            AppEvent::LogoLoaded(logo) => {
                if logo.is_some() {
                    self.state.write().logo = logo;
                }
            }
            AppEvent::ConnectionChecked(connected) => {
                self.state.write().connected = connected;
            }
            AppEvent::RemoteUpdate(update) => {
                self.db.apply_update(&update);

                let mut state = self.state.write();
                if let Some(rates) = update.rates {
                    state.rates = rates;
                    state.connected = true;
                    state.recalculate();
                }
                match update.logo {
                    LogoChange::Unchanged => {}
                    LogoChange::Cleared => state.logo = None,
                    LogoChange::Set(uri) => state.logo = Some(uri),
                }
                state.updates_received += 1;
                tracing::info!(updates_received = state.updates_received, "Applied realtime update");
            }
            AppEvent::RealtimeClosed => {
                self.state.write().realtime_active = false;
            }
        }
    }

    // ========== Calculator ==========

    /// Set both money inputs (pt-BR notation) and recompute the plan.
    pub fn set_inputs(&self, product: &str, down_payment: &str) -> Result<InstallmentPlan> {
        let mut state = self.state.write();
        let plan = calculator::plan_from_inputs(product, down_payment, &state.rates)?;
        state.calculator.product_value = plan.product_value;
        state.calculator.down_payment = plan.down_payment;
        state.calculator.plan = Some(plan.clone());
        Ok(plan)
    }

    pub fn current_plan(&self) -> Option<InstallmentPlan> {
        self.state.read().calculator.plan.clone()
    }

    // ========== Session ==========

    /// Sign in as admin.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let check = crate::utils::validation::validate_email(email);
        if !check.is_valid {
            return Err(AppError::Validation(check.error.unwrap_or_default()));
        }
        self.db.login(email, password).await
    }

    /// Sign out and return to the calculator.
    pub async fn logout(&self) {
        self.db.logout().await;
        let mut state = self.state.write();
        state.current_view = View::Calculator;
        state.admin = AdminState::default();
    }

    /// Switch to the admin view. Requires a valid session.
    pub async fn open_admin(&self) -> Result<AuthUser> {
        let Some(user) = self.db.authenticated_user().await else {
            return Err(AppError::Auth("Not signed in. Run `calculator login <EMAIL>` first.".to_string()));
        };

        let mut state = self.state.write();
        state.current_view = View::Admin;
        state.admin.user = Some(user.clone());
        tracing::info!(user_id = %user.id, "Admin view opened");
        Ok(user)
    }

    pub fn close_admin(&self) {
        let mut state = self.state.write();
        state.current_view = View::Calculator;
        state.admin.status = None;
        state.admin.password_status = None;
    }

    fn require_admin(&self) -> Result<()> {
        if self.state.read().current_view == View::Admin {
            Ok(())
        } else {
            Err(AppError::Auth("Admin view is not open".to_string()))
        }
    }

    // ========== Admin ==========

    /// Apply rate edits and save them. `Err` only for invalid edits or a closed admin view.
    pub async fn save_rates(&self, edits: &[(u8, f64)]) -> Result<StatusMessage> {
        self.require_admin()?;

        let rates = {
            let mut state = self.state.write();
            let rates = admin::apply_edits(&state.rates, edits)?;
            state.rates = rates.clone();
            state.admin.saving = true;
            state.recalculate();
            rates
        };

        let outcome = self.db.save_rates(&rates).await;
        let message = admin::save_message(&outcome);

        let mut state = self.state.write();
        state.admin.saving = false;
        state.connected = outcome.success;
        state.admin.status = Some(message.clone());
        Ok(message)
    }

    /// Encode an image file and save it as the store logo.
    pub async fn set_logo(&self, path: &Path) -> Result<StatusMessage> {
        self.require_admin()?;
        let data_uri = logo::encode_file(path)?;

        self.state.write().admin.saving = true;
        let outcome = self.db.save_logo(&data_uri).await;
        let message = admin::logo_message(&outcome);

        let mut state = self.state.write();
        state.admin.saving = false;
        if outcome.success {
            state.logo = Some(data_uri);
            state.connected = true;
        }
        state.admin.status = Some(message.clone());
        Ok(message)
    }

    pub async fn remove_logo(&self) -> Result<StatusMessage> {
        self.require_admin()?;
        let removed = self.db.remove_logo().await;

        let message = if removed {
            StatusMessage::success(admin::LOGO_REMOVED)
        } else {
            StatusMessage::error(admin::SAVE_FALLBACK_ERROR)
        };

        let mut state = self.state.write();
        state.logo = None;
        state.admin.status = Some(message.clone());
        Ok(message)
    }

    /// Change the admin password.
    pub async fn change_password(&self, new_password: &str) -> Result<StatusMessage> {
        self.require_admin()?;

        let message = match admin::check_new_password(new_password) {
            Err(message) => message,
            Ok(()) => match self.db.update_password(new_password).await {
                Ok(true) => StatusMessage::success(admin::PASSWORD_SUCCESS),
                Ok(false) => StatusMessage::error(admin::PASSWORD_FAILURE),
                Err(e) => {
                    tracing::warn!(error = %e, "Password change failed");
                    StatusMessage::error(admin::PASSWORD_FAILURE)
                }
            },
        };

        self.state.write().admin.password_status = Some(message.clone());
        Ok(message)
    }
}
