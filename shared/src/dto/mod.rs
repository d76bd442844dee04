//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with the configuration backend and persisted in
//! the local store.
//!
//! ## Module Organization
//!
//! - [`rates`] - Rate table (installment count → percentage)
//! - [`config`] - The single remote configuration row, save outcomes
//! - [`auth`] - Password grant, session and backend error bodies
//! - [`installments`] - Rows produced by the calculator
//!
//! ## Example JSON Communication
//!
//! ```text
//! GET /rest/v1/istore_config?select=rates&limit=1
//!
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! [
//!   { "rates": { "1": 0, "2": 4.0, "3": 4.5 } }
//! ]
//! ```

pub mod auth;
pub mod config;
pub mod installments;
pub mod rates;

pub use auth::*;
pub use config::*;
pub use installments::*;
pub use rates::*;
