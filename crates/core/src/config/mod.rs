//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PETREL_*)
//! 2. TOML config file (if PETREL_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Cache generation names, the precache manifest, and fallback entries all
//! live here and are handed to the worker at construction; there is no
//! process-wide cache-name singleton.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::cache::generation::{CacheGeneration, GenerationKind};

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PETREL_*)
/// 2. TOML config file (if PETREL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin that root-relative manifest and fallback paths resolve
    /// against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Application name used in cache generation labels.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Version tag used in cache generation labels. Deploying a new tag is
    /// what retires the previous generations at the next activation.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Install-time precache manifest: root-relative paths or absolute
    /// URLs.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Precached document served as the offline fallback for HTML
    /// requests.
    #[serde(default = "default_app_shell_path")]
    pub app_shell_path: String,

    /// Precached image served as the offline fallback for image requests.
    #[serde(default = "default_fallback_image_path")]
    pub fallback_image_path: String,

    /// Whether install is all-or-nothing (true) or best-effort
    /// skip-and-log (false).
    #[serde(default = "default_true")]
    pub strict_precache: bool,

    /// User-Agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to accept per response body.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum redirects to follow per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Concurrent fetches during install-time precaching.
    #[serde(default = "default_precache_concurrency")]
    pub precache_concurrency: usize,

    /// Sync tag the background-sync handler responds to.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Title for synthesized push notifications.
    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// Icon path for synthesized push notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    /// Badge path for synthesized push notifications.
    #[serde(default = "default_notification_badge")]
    pub notification_badge: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./petrel-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_app_name() -> String {
    "app".into()
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_precache_urls() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/assets/img/logo.png".into(),
        "/assets/img/favicon.png".into(),
    ]
}

fn default_app_shell_path() -> String {
    "/index.html".into()
}

fn default_fallback_image_path() -> String {
    "/assets/img/logo.png".into()
}

fn default_user_agent() -> String {
    "petrel/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

fn default_precache_concurrency() -> usize {
    4
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_notification_title() -> String {
    "petrel".into()
}

fn default_notification_icon() -> String {
    "/assets/img/favicon.png".into()
}

fn default_notification_badge() -> String {
    "/assets/img/apple-touch-icon.png".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            app_name: default_app_name(),
            cache_version: default_cache_version(),
            precache_urls: default_precache_urls(),
            app_shell_path: default_app_shell_path(),
            fallback_image_path: default_fallback_image_path(),
            strict_precache: true,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            precache_concurrency: default_precache_concurrency(),
            sync_tag: default_sync_tag(),
            notification_title: default_notification_title(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_badge(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as a Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The current static generation.
    pub fn static_generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.app_name, GenerationKind::Static, &self.cache_version)
    }

    /// The current dynamic generation.
    pub fn dynamic_generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.app_name, GenerationKind::Dynamic, &self.cache_version)
    }

    /// Parsed origin URL.
    pub fn origin_url(&self) -> Result<Url, Error> {
        Url::parse(&self.origin).map_err(|e| Error::InvalidUrl(format!("{}: {}", self.origin, e)))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PETREL_`
    /// 2. TOML file from `PETREL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PETREL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PETREL_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./petrel-cache.sqlite"));
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.user_agent, "petrel/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.sync_tag, "background-sync");
        assert!(config.strict_precache);
        assert!(!config.precache_urls.is_empty());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_generation_labels() {
        let config = AppConfig { app_name: "cad".into(), cache_version: "v2.1.0".into(), ..Default::default() };
        assert_eq!(config.static_generation().label(), "cad-static-v2.1.0");
        assert_eq!(config.dynamic_generation().label(), "cad-dynamic-v2.1.0");
    }

    #[test]
    fn test_origin_url_parses() {
        let config = AppConfig::default();
        let origin = config.origin_url().unwrap();
        assert_eq!(origin.scheme(), "http");
        assert_eq!(origin.host_str(), Some("localhost"));
    }

    #[test]
    fn test_origin_url_invalid() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(Error::InvalidUrl(_))));
    }
}
