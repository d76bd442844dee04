//! # Backend API Client Module
//!
//! HTTP and websocket client for the hosted configuration backend.
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs           - Module exports and documentation
//! ├── client.rs        - SupabaseClient struct, headers, trait impls
//! ├── auth.rs          - Auth endpoints (sign in, refresh, user, logout)
//! ├── config_table.rs  - REST endpoints for the configuration row
//! └── realtime.rs      - Websocket subscription to row updates
//! ```

pub mod auth;
pub mod client;
pub mod config_table;
pub mod realtime;

pub use client::SupabaseClient;
pub use realtime::{ConfigUpdate, LogoChange};
