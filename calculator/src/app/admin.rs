//! # Admin Form Logic
//!
//! Conversion between the rate table and the text shown in the admin form,
//! plus the status messages the admin sees after each action.
//!
//! Rates are typed with a decimal comma (`4,5`); a blank slot means 0%.

use crate::core::error::{AppError, Result};
use crate::utils::validation::{validate_password, validate_rate_input};
use shared::{format_decimal_comma, parse_decimal_comma, RateTable, SaveOutcome};

pub const SAVE_SUCCESS: &str = "Salvo e Sincronizado!";
pub const SAVE_FALLBACK_ERROR: &str = "Erro de Permissão ou Rede";
pub const PASSWORD_SUCCESS: &str = "Senha alterada com sucesso!";
pub const PASSWORD_FAILURE: &str = "Erro ao alterar senha.";
pub const LOGIN_FAILURE: &str = "Login falhou. Verifique suas credenciais.";
pub const LOGO_FAILURE: &str = "Não foi possível salvar a imagem.";
pub const LOGO_REMOVED: &str = "Logo removido.";
pub const STATUS_CONNECTED: &str = "Modo Admin: Conectado";
pub const STATUS_DISCONNECTED: &str = "Atenção: Sem conexão ou permissão";

/// Outcome of an admin action, shown as a one-line banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Text for one rate slot: empty for 0%, decimal comma otherwise.
pub fn display_rate(rate: f64) -> String {
    if rate == 0.0 {
        String::new()
    } else {
        format_decimal_comma(rate)
    }
}

/// Every slot (1..=21) with its display text.
pub fn display_rates(rates: &RateTable) -> Vec<(u8, String)> {
    rates.slots().map(|(n, rate)| (n, display_rate(rate))).collect()
}

/// Parse a typed rate. Blank is 0%.
pub fn parse_rate_input(input: &str) -> Result<f64> {
    let input = input.trim();
    let check = validate_rate_input(input);
    if !check.is_valid {
        return Err(AppError::Validation(check.error.unwrap_or_default()));
    }
    Ok(parse_decimal_comma(input))
}

/// Parse a command-line edit of the form `N=VALUE` (e.g. `3=4,5`, `7=`).
pub fn parse_rate_edit(edit: &str) -> Result<(u8, f64)> {
    let (slot, value) = edit
        .split_once('=')
        .ok_or_else(|| AppError::Validation(format!("Expected N=VALUE, got {:?}", edit)))?;

    let installments: u8 = slot
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid installment count {:?}", slot)))?;

    Ok((installments, parse_rate_input(value)?))
}

/// Copy of `current` with `edits` applied in order (later edits win).
pub fn apply_edits(current: &RateTable, edits: &[(u8, f64)]) -> Result<RateTable> {
    let mut rates = current.clone();
    for (n, rate) in edits {
        rates.set(*n, *rate).map_err(AppError::Validation)?;
    }
    Ok(rates)
}

/// Banner for a rate save.
pub fn save_message(outcome: &SaveOutcome) -> StatusMessage {
    if outcome.success {
        return StatusMessage::success(SAVE_SUCCESS);
    }
    match outcome.error.as_deref().filter(|e| !e.is_empty()) {
        Some(error) => StatusMessage::error(format!("Erro: {}", error)),
        None => StatusMessage::error(SAVE_FALLBACK_ERROR),
    }
}

/// Banner for a logo save.
pub fn logo_message(outcome: &SaveOutcome) -> StatusMessage {
    if outcome.success {
        return StatusMessage::success(SAVE_SUCCESS);
    }
    let error = outcome
        .error
        .as_deref()
        .filter(|e| !e.is_empty())
        .unwrap_or("Desconhecido");
    StatusMessage::error(format!("{}\nErro: {}", LOGO_FAILURE, error))
}

/// Check a new password before it is sent.
pub fn check_new_password(password: &str) -> std::result::Result<(), StatusMessage> {
    let check = validate_password(password);
    if check.is_valid {
        Ok(())
    } else {
        Err(StatusMessage::error(check.error.unwrap_or_default()))
    }
}
