//! # iStore Installment Calculator - Library Root
//!
//! Computes installment-payment breakdowns for a retail product and lets the
//! store admin edit the interest rate table and the store logo. This library
//! crate contains all modules used by the binary crate (`main.rs`).
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              calculator (this crate)                   │
//! ├────────────────────────────────────────────────────────┤
//! │  clap          - Command line                          │
//! │  Tokio         - Async runtime                         │
//! │  Reqwest       - REST + auth client                    │
//! │  Tungstenite   - Realtime websocket                    │
//! │  tracing       - Structured file logging               │
//! └────────────────────────────────────────────────────────┘
//!          │                              │
//!          │ HTTP / WS                    │ JSON file
//!          ▼                              ▼
//! ┌─────────────────┐          ┌─────────────────────────┐
//! │  Hosted backend │          │   Local store           │
//! │  (config row)   │          │   (.istore/)            │
//! └─────────────────┘          └─────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **app**: State, events and the [`app::App`] orchestrator
//!   - `calculator`: installment math
//!   - `admin`: rate form conversions and status messages
//! - **core**: Settings, error type, backend traits
//! - **services**: Backend client, local store, data-access facade, logo encoding
//! - **ui**: Plain-text rendering of tables and banners
//! - **debug**: Logging setup
//! - **utils**: Input validation
//!
//! ### Module Dependency Graph
//!
//! ```text
//! main.rs
//!   │
//!   ├── app (state, events, admin actions)
//!   │   └── services::database
//!   │       ├── services::api (REST, auth, realtime)
//!   │       └── services::cache (local store)
//!   │
//!   └── ui (text tables)
//! ```
//!
//! ## Degradation
//!
//! Every backend read is bounded by a timeout and falls back to the local
//! store, so the calculator always answers, with defaults on a fresh install.

pub mod app;
pub mod core;
pub mod debug;
pub mod services;
pub mod ui;
pub mod utils;

pub use app::{App, AppEvent, AppState, View};
pub use crate::core::{AppError, Result, Settings};
pub use services::database::Database;
