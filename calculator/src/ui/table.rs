//! Installment and rate tables

use crate::app::admin::{display_rates, StatusMessage};
use crate::app::calculator::EMPTY_PRODUCT_HINT;
use crate::app::AppState;
use shared::{format_brl, InstallmentPlan, RateTable};
use std::fmt::Write;

const PLAN_HEADER: &str = "Opções de Parcelamento";
const FINANCED_LABEL: &str = "O valor parcelado é";

/// Installment options for a plan, one line per installment count.
///
/// ```text
/// O valor parcelado é R$ 1.000,00
///
/// Opções de Parcelamento
///  1x de R$ 1.000,00  (Total: R$ 1.000,00)
///  2x de R$ 520,00  (Total: R$ 1.040,00)
/// ```
pub fn render_plan(plan: &InstallmentPlan) -> String {
    if plan.product_value <= 0.0 {
        return format!("{}\n", EMPTY_PRODUCT_HINT);
    }

    let mut out = String::new();
    if plan.financed > 0.0 {
        let _ = writeln!(out, "{} {}\n", FINANCED_LABEL, format_brl(plan.financed));
    }

    let _ = writeln!(out, "{}", PLAN_HEADER);
    for row in &plan.rows {
        let _ = writeln!(
            out,
            "{:>2}x de {}  (Total: {})",
            row.installments,
            format_brl(row.monthly),
            format_brl(row.total)
        );
    }
    out
}

/// Every rate slot as shown in the admin form (blank = 0%).
pub fn render_rates(rates: &RateTable) -> String {
    let mut out = String::from("Parcelas  Juros (%)\n");
    for (n, text) in display_rates(rates) {
        let _ = writeln!(out, "{:>7}x  {}", n, text);
    }
    out
}

/// One-line banner for an admin action.
pub fn render_status(message: &StatusMessage) -> String {
    let marker = if message.is_error { "✗" } else { "✓" };
    format!("{} {}", marker, message.text)
}

/// Connectivity, session and logo summary.
pub fn render_overview(state: &AppState) -> String {
    let mut out = String::new();
    let backend = if state.online { "configured" } else { "not configured (offline)" };
    let _ = writeln!(out, "Backend:   {}", backend);
    let _ = writeln!(out, "Status:    {}", state.connection_label());
    let user = state
        .admin
        .user
        .as_ref()
        .map(|u| u.email.clone().unwrap_or_else(|| u.id.clone()))
        .unwrap_or_else(|| "not signed in".to_string());
    let _ = writeln!(out, "Admin:     {}", user);
    let logo = match &state.logo {
        Some(uri) => format!("custom ({} bytes)", uri.len()),
        None => "default".to_string(),
    };
    let _ = writeln!(out, "Logo:      {}", logo);
    let _ = writeln!(out, "Rates:     {} configured slots", state.rates.len());
    out
}
