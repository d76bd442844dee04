//! # Shared Utility Functions
//!
//! Money handling in the Brazilian convention used by the store: `.` groups
//! thousands and `,` separates cents.
//!
//! - [`parse_money`] - `"1.234,56"` → `1234.56`
//! - [`format_brl`] - `1234.56` → `"R$ 1.234,56"`
//! - [`format_decimal_comma`] - `4.5` → `"4,5"` (rate display)
//! - [`parse_decimal_comma`] - `"4,5"` → `4.5`
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::{format_brl, parse_money};
//!
//! let value = parse_money("2.500,00").unwrap();
//! assert_eq!(value, 2500.0);
//! assert_eq!(format_brl(value / 3.0), "R$ 833,33");
//! ```

/// Parse a money amount typed in pt-BR notation.
///
/// An optional `R$` prefix and surrounding whitespace are ignored. Empty input
/// is zero, matching a blank form field.
///
/// # Examples
///
/// ```rust
/// use shared::utils::parse_money;
///
/// assert_eq!(parse_money("1.234,56"), Ok(1234.56));
/// assert_eq!(parse_money("R$ 99,90"), Ok(99.9));
/// assert_eq!(parse_money(""), Ok(0.0));
/// assert!(parse_money("abc").is_err());
/// ```
pub fn parse_money(input: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let normalized = trimmed.replace('.', "").replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| format!("Invalid money value: {:?}", input))?;

    if !value.is_finite() {
        return Err(format!("Invalid money value: {:?}", input));
    }
    Ok(value)
}

/// Format an amount as Brazilian reais, rounded to cents.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_brl;
///
/// assert_eq!(format_brl(0.0), "R$ 0,00");
/// assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
/// assert_eq!(format_brl(-5.5), "-R$ 5,50");
/// ```
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return format!("R$ {}", value);
    }

    // Rounded cents stay an f64 so amounts beyond u64 still print every digit
    let cents = (value.abs() * 100.0).round();
    let digits = format!("{:03.0}", cents);
    let (whole, fraction) = digits.split_at(digits.len() - 2);

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, fraction)
}

/// Render a number with a decimal comma and no trailing zeros (`4.0` → `"4"`).
pub fn format_decimal_comma(value: f64) -> String {
    value.to_string().replace('.', ",")
}

/// Parse a number typed with a decimal comma. Empty or unparsable input is `0`.
pub fn parse_decimal_comma(input: &str) -> f64 {
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
