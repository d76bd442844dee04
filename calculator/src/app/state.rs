//! # Application State Types
//!
//! State shared between the command handlers and background tasks: the
//! current view, the last-known rates and logo, connectivity, and the
//! per-view form state.

use super::admin::StatusMessage;
use super::calculator::compute_plan;
use shared::{AuthUser, InstallmentPlan, RateTable};

/// Application views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Installment table for a product value (default)
    Calculator,
    /// Rate, logo and password editing (requires a signed-in admin)
    Admin,
}

impl View {
    /// View title for header display
    pub fn title(&self) -> &'static str {
        match self {
            View::Calculator => "Calculadora de Parcelas",
            View::Admin => "Configurações",
        }
    }
}

/// Calculator form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorState {
    pub product_value: f64,
    pub down_payment: f64,
    /// Plan for the current inputs and rates
    pub plan: Option<InstallmentPlan>,
}

/// Admin view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    /// Signed-in admin, set when the view is opened
    pub user: Option<AuthUser>,
    /// Banner from the last rate or logo action
    pub status: Option<StatusMessage>,
    /// Banner from the last password change
    pub password_status: Option<StatusMessage>,
    /// A save is in flight
    pub saving: bool,
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub current_view: View,
    /// Last-known rate table (defaults → cache → backend → realtime)
    pub rates: RateTable,
    /// Last-known logo data URI
    pub logo: Option<String>,
    /// A backend is configured
    pub online: bool,
    /// Last backend exchange succeeded
    pub connected: bool,
    /// Realtime subscription is running
    pub realtime_active: bool,
    /// Realtime updates applied since startup
    pub updates_received: u64,
    pub calculator: CalculatorState,
    pub admin: AdminState,
}

impl AppState {
    /// State before any backend answer: cached values, calculator view.
    pub fn new(rates: RateTable, logo: Option<String>, online: bool) -> Self {
        Self {
            current_view: View::Calculator,
            rates,
            logo,
            online,
            connected: false,
            realtime_active: false,
            updates_received: 0,
            calculator: CalculatorState::default(),
            admin: AdminState::default(),
        }
    }

    /// Recompute the calculator plan after inputs or rates changed.
    pub fn recalculate(&mut self) {
        let plan = compute_plan(self.calculator.product_value, self.calculator.down_payment, &self.rates);
        self.calculator.plan = Some(plan);
    }

    /// Admin connectivity banner.
    pub fn connection_label(&self) -> &'static str {
        if self.connected {
            super::admin::STATUS_CONNECTED
        } else {
            super::admin::STATUS_DISCONNECTED
        }
    }
}
