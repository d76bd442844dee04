//! # Installment Calculation
//!
//! The financed amount is split into 1 to 21 payments, each count carrying its
//! own interest percentage from the [`RateTable`]:
//!
//! ```text
//! financed = product - down_payment
//! total    = financed * (1 + rate[n] / 100)
//! monthly  = total / n
//! ```

use crate::core::error::{AppError, Result};
use shared::{parse_money, InstallmentPlan, InstallmentRow, RateTable, MAX_INSTALLMENTS, MIN_INSTALLMENTS};

/// Hint shown instead of the table while no product value is entered.
pub const EMPTY_PRODUCT_HINT: &str = "Digite o valor para ver as parcelas.";

/// Compute every installment option for a product and down payment.
///
/// No rows are produced when nothing is left to finance.
pub fn compute_plan(product_value: f64, down_payment: f64, rates: &RateTable) -> InstallmentPlan {
    let financed = product_value - down_payment;

    let rows = if financed > 0.0 {
        (MIN_INSTALLMENTS..=MAX_INSTALLMENTS)
            .map(|n| {
                let total = financed * (1.0 + rates.rate(n) / 100.0);
                InstallmentRow {
                    installments: n,
                    monthly: total / f64::from(n),
                    total,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    InstallmentPlan {
        product_value,
        down_payment,
        financed,
        rows,
    }
}

/// Parse both money fields (pt-BR notation) and compute the plan.
pub fn plan_from_inputs(product: &str, down_payment: &str, rates: &RateTable) -> Result<InstallmentPlan> {
    let product_value = parse_money(product).map_err(AppError::Validation)?;
    let down_payment = parse_money(down_payment).map_err(AppError::Validation)?;

    if product_value < 0.0 || down_payment < 0.0 {
        return Err(AppError::Validation("Values cannot be negative".to_string()));
    }

    Ok(compute_plan(product_value, down_payment, rates))
}
