//! # Logging
//!
//! File-based structured logging for the calculator.
//!
//! - [`config`]: logging settings read from the environment
//! - [`logger`]: subscriber setup (daily rotated file + stderr warnings) and panic hook

pub mod config;
pub mod logger;

pub use config::LogConfig;
pub use logger::init;
