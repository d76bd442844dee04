//! # Common Error Types
//!
//! Consolidated error handling for the calculator.
//!
//! ## Error Categories
//!
//! - **Api**: Backend REST communication errors (network, HTTP, JSON parsing)
//! - **Auth**: Sign-in, session and password update failures
//! - **Cache**: Local store read/write failures
//! - **Validation**: Input validation errors (money values, rates, passwords)
//! - **Timeout**: A bounded backend read did not answer in time
//! - **Offline**: No backend is configured
//!
//! ## Usage Pattern
//!
//! ```rust
//! use calculator::core::error::AppError;
//!
//! fn validate_price(amount: f64) -> Result<f64, AppError> {
//!     if amount < 0.0 {
//!         return Err(AppError::Validation("Price cannot be negative".to_string()));
//!     }
//!     Ok(amount)
//! }
//! ```

use thiserror::Error;

/// Application-wide error type.
///
/// Each variant carries a human-readable message. `Display` adds the category
/// prefix; [`AppError::message`] returns the bare text shown to the admin.
///
/// # Example
///
/// ```rust
/// use calculator::core::error::AppError;
///
/// let err = AppError::Api("permission denied".to_string());
/// assert_eq!(err.to_string(), "API error: permission denied");
/// assert_eq!(err.message(), "permission denied");
/// assert_eq!(AppError::Offline.to_string(), "Offline");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend REST communication error.
    ///
    /// - Network failures (connection refused, DNS errors)
    /// - HTTP errors (4xx, 5xx) with the backend's message
    /// - JSON parsing errors (malformed responses)
    #[error("API error: {0}")]
    Api(String),

    /// Authentication error (invalid credentials, expired or revoked session).
    #[error("Auth error: {0}")]
    Auth(String),

    /// Local store error (unwritable cache directory, serialization).
    #[error("Cache error: {0}")]
    Cache(String),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A bounded backend call exceeded its timeout (milliseconds).
    #[error("Timeout after {0} ms")]
    Timeout(u64),

    /// No backend configured, or offline mode forced.
    #[error("Offline")]
    Offline,
}

impl AppError {
    /// Message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            AppError::Api(msg)
            | AppError::Auth(msg)
            | AppError::Cache(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::Timeout(_) => "Timeout".to_string(),
            AppError::Offline => "Offline".to_string(),
        }
    }
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Api(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Api(msg.to_string())
    }
}
