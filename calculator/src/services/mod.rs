//! # Services
//!
//! External integrations and persistence.
//!
//! - **[`api`]**: HTTP + websocket client for the hosted backend
//! - **[`cache`]**: JSON-file local store (offline mirror)
//! - **[`database`]**: Data-access facade combining both, with timeouts
//! - **[`logo`]**: Image file → data URI encoding and validation

pub mod api;
pub mod cache;
pub mod database;
pub mod logo;

#[cfg(test)]
pub(crate) mod mock;
