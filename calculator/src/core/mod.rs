//! # Core Abstractions
//!
//! Core traits, configuration and error types shared by every layer of the
//! calculator.
//!
//! ## Modules
//!
//! - **[`config`]**: Settings loaded from the environment (`Settings`)
//! - **[`error`]**: Application error types (`AppError`, `Result<T>`)
//! - **[`service`]**: Backend traits for dependency injection (`ConfigBackend`, `AuthService`)
//!
//! ## Dependency Injection
//!
//! The data-access layer only sees the backend through the service traits:
//!
//! ```rust,ignore
//! use calculator::core::service::Backend;
//!
//! // In production: the HTTP client
//! let backend: Arc<dyn Backend> = Arc::new(SupabaseClient::new(&backend_settings)?);
//!
//! // In tests: an in-memory mock
//! let backend: Arc<dyn Backend> = Arc::new(MockBackend::default());
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::{BackendSettings, Settings};
pub use error::{AppError, Result};
pub use service::{AuthService, Backend, ConfigBackend};
