//! Configuration validation.

use thiserror::Error;

use super::AppConfig;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_LOAD_FAILED: {0}")]
    LoadFailed(String),

    #[error("CONFIG_INVALID: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

impl AppConfig {
    /// Validate configuration values against sane bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid("timeout_ms", "must not exceed 300s"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        if self.app_name.trim().is_empty() {
            return Err(ConfigError::invalid("app_name", "must not be empty"));
        }

        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::invalid("cache_version", "must not be empty"));
        }

        match url::Url::parse(&self.origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::invalid(
                    "origin",
                    format!("scheme must be http or https, got {}", url.scheme()),
                ));
            }
            Err(e) => {
                return Err(ConfigError::invalid("origin", format!("not a valid URL: {e}")));
            }
        }

        if self.precache_concurrency == 0 {
            return Err(ConfigError::invalid("precache_concurrency", "must be at least 1"));
        }

        Ok(())
    }
}
