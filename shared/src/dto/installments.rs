//! # Installment Rows
//!
//! Output of the calculator: one row per installment count.

use serde::{Deserialize, Serialize};

/// One installment option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRow {
    /// Number of payments
    pub installments: u8,
    /// Value of each payment
    pub monthly: f64,
    /// Financed amount with interest applied
    pub total: f64,
}

/// Full breakdown for one product/down-payment pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub product_value: f64,
    pub down_payment: f64,
    /// `product_value - down_payment`
    pub financed: f64,
    /// Empty when `financed <= 0`
    pub rows: Vec<InstallmentRow>,
}
