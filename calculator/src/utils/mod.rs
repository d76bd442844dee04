//! # Utility Functions
//!
//! Input validation used by the command line and the admin handlers.
//!
//! ## Modules
//!
//! - **[`validation`]**: Email, password and rate input checks
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: Money parsing and formatting (pt-BR)
//! - [`crate::core`]: Core abstractions and error types

pub mod validation;
