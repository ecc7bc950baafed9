//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LECTERN_*)
//! 2. TOML config file (if LECTERN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::canon::Translation;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LECTERN_*)
/// 2. TOML config file (if LECTERN_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the content root serving translation directories.
    ///
    /// Set via LECTERN_CONTENT_BASE_URL environment variable.
    #[serde(default = "default_content_base_url")]
    pub content_base_url: String,

    /// Path to the SQLite chapter cache database.
    ///
    /// Set via LECTERN_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Active translation.
    ///
    /// Set via LECTERN_TRANSLATION environment variable (asv, web, kjv).
    #[serde(default)]
    pub translation: Translation,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via LECTERN_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via LECTERN_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether to extract structured word annotations for translations that
    /// embed lexicon tokens. Token stripping happens regardless.
    ///
    /// Set via LECTERN_EXTRACT_ANNOTATIONS environment variable.
    #[serde(default = "default_true")]
    pub extract_annotations: bool,
}

fn default_content_base_url() -> String {
    "http://localhost:8080/bibles".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./lectern-cache.sqlite")
}

fn default_user_agent() -> String {
    "lectern/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_base_url: default_content_base_url(),
            db_path: default_db_path(),
            translation: Translation::default(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            extract_annotations: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LECTERN_`
    /// 2. TOML file from `LECTERN_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("LECTERN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LECTERN_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
