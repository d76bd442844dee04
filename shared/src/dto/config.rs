//! # Configuration Record DTOs
//!
//! The backend keeps a single configuration row holding the rate table and the
//! store logo. Reads select one column at a time; writes send only the column
//! being changed.

use super::rates::RateTable;
use serde::{Deserialize, Serialize};

/// The remote configuration row.
///
/// Every field is optional so the same type serves column-subset reads
/// (`select=id`, `select=rates`) and partial writes (`{"logo": ""}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<RateTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl ConfigRecord {
    /// Write payload changing only the rate table.
    pub fn with_rates(rates: RateTable) -> Self {
        Self {
            rates: Some(rates),
            ..Self::default()
        }
    }

    /// Write payload changing only the logo. An empty string clears it.
    pub fn with_logo(logo: impl Into<String>) -> Self {
        Self {
            logo: Some(logo.into()),
            ..Self::default()
        }
    }
}

/// Result of a save operation, shown to the admin as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
