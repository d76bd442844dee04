//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the calculator client, its local
//! store and the remote configuration backend. All DTOs use JSON serialization
//! via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::rates`]**: Interest rate table keyed by installment count
//!   - **[`dto::config`]**: Remote configuration record and save outcomes
//!   - **[`dto::auth`]**: Sign-in, session and error DTOs
//!   - **[`dto::installments`]**: Computed installment rows
//! - **[`utils`]**: Money parsing and formatting (pt-BR / BRL)
//!
//! ## Wire Format
//!
//! - Field names are snake_case, matching the backend columns
//! - Optional fields are omitted from JSON when `None`
//! - Rate tables serialize as objects with stringified integer keys:
//!   `{"1":0.0,"2":4.0}`
//!
//! ## Usage
//!
//! ```rust
//! use shared::{RateTable, utils::format_brl};
//!
//! let rates = RateTable::defaults();
//! assert_eq!(rates.rate(3), 4.5);
//! assert_eq!(format_brl(1234.5), "R$ 1.234,50");
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: shared is a DTO library where all exports are public API
pub use dto::*;
pub use utils::*;
