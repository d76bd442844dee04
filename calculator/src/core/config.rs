//! # Application Configuration
//!
//! Settings are read from environment variables once at startup and validated
//! before anything touches the network.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ISTORE_BACKEND_URL` | unset (offline) |
//! | `ISTORE_BACKEND_KEY` | unset (offline) |
//! | `ISTORE_CONFIG_TABLE` | `istore_config` |
//! | `ISTORE_CACHE_DIR` | `.istore` |
//! | `ISTORE_TIMEOUT_MS` | `2000` |
//!
//! Logging has its own settings in [`crate::debug::LogConfig`] since it starts
//! before these are loaded.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TABLE: &str = "istore_config";
const DEFAULT_CACHE_DIR: &str = ".istore";
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Realtime channel name used when joining the config table topic.
pub const REALTIME_CHANNEL: &str = "rates-updates";

/// Connection settings for the remote backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSettings {
    /// Base URL, e.g. `https://project.supabase.co`
    pub url: String,
    /// Publishable (anonymous) API key
    pub api_key: String,
    /// Configuration table name
    pub table: String,
}

/// Application settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Remote backend; `None` runs fully offline on cached values.
    pub backend: Option<BackendSettings>,
    /// Directory holding the local store file
    pub cache_dir: PathBuf,
    /// Bound applied to each read
    pub timeout: Duration,
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let timeout_ms = match env::var("ISTORE_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("ISTORE_TIMEOUT_MS must be a valid number: {}", e))?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };
        let timeout = Duration::from_millis(timeout_ms);

        let url = non_empty_var("ISTORE_BACKEND_URL");
        let api_key = non_empty_var("ISTORE_BACKEND_KEY");
        let backend = match (url, api_key) {
            (Some(url), Some(api_key)) => Some(BackendSettings {
                url: url.trim_end_matches('/').to_string(),
                api_key,
                table: non_empty_var("ISTORE_CONFIG_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(
                    "ISTORE_BACKEND_URL and ISTORE_BACKEND_KEY must be set together".to_string(),
                )
            }
        };

        Ok(Self {
            backend,
            cache_dir: non_empty_var("ISTORE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            timeout,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout < Duration::from_millis(100) || self.timeout > Duration::from_secs(60) {
            return Err("ISTORE_TIMEOUT_MS must be between 100 and 60000".to_string());
        }

        if let Some(backend) = &self.backend {
            if !(backend.url.starts_with("http://") || backend.url.starts_with("https://")) {
                return Err(format!(
                    "ISTORE_BACKEND_URL must start with http:// or https://, got {}",
                    backend.url
                ));
            }
            if backend.table.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
                return Err("ISTORE_CONFIG_TABLE may only contain letters, digits and _".to_string());
            }
        }

        Ok(())
    }

    /// Drop the backend, forcing offline mode.
    pub fn offline(mut self) -> Self {
        self.backend = None;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str, table: &str) -> BackendSettings {
        BackendSettings {
            url: url.to_string(),
            api_key: "key".to_string(),
            table: table.to_string(),
        }
    }

    #[test]
    fn test_default_is_offline_and_valid() {
        let settings = Settings::default();
        assert!(settings.backend.is_none());
        assert_eq!(settings.timeout, Duration::from_millis(2000));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let settings = Settings {
            backend: Some(backend("ftp://example.com", DEFAULT_TABLE)),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_table_name() {
        let settings = Settings {
            backend: Some(backend("https://example.com", "config; drop")),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_extreme_timeouts() {
        let settings = Settings {
            timeout: Duration::from_millis(5),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_offline_drops_backend() {
        let settings = Settings {
            backend: Some(backend("https://example.com", DEFAULT_TABLE)),
            ..Settings::default()
        }
        .offline();
        assert!(settings.backend.is_none());
    }
}
