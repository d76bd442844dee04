//! Logging configuration from environment variables

use std::path::PathBuf;

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "calculator=info,warn";

/// File name of the rotated log, inside [`LogConfig::log_dir`].
pub const LOG_FILE_NAME: &str = "calculator.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log directory (for rotation)
    pub log_dir: PathBuf,
    /// Log level filter (e.g., "calculator=debug,info")
    pub log_level: String,
    /// Mirror warnings and errors to stderr
    pub stderr_warnings: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            stderr_warnings: true,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    ///
    /// - `ISTORE_LOG_DIR`: log directory (default `logs`)
    /// - `RUST_LOG`: filter (default `calculator=info,warn`)
    /// - `ISTORE_LOG_STDERR`: `0` silences the stderr layer
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_dir: lookup("ISTORE_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            stderr_warnings: lookup("ISTORE_LOG_STDERR")
                .map(|v| v != "0")
                .unwrap_or(defaults.stderr_warnings),
        }
    }

    /// Path of today's log file prefix
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}
