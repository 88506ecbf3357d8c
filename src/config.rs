//! Formatter settings
//!
//! There is no config file. Values come from CLI flags, which fall back to
//! environment variables through clap; library callers can use
//! `FormatterConfig::from_env`.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const ENV_API_KEY: &str = "SHEETWRAP_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "SHEETWRAP_MODEL";
pub const ENV_BASE_URL: &str = "SHEETWRAP_BASE_URL";
pub const ENV_MEMORY: &str = "SHEETWRAP_MEMORY";

/// Settings for the external reformatting service
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FormatterConfig {
    /// Defaults overridden by `SHEETWRAP_*` variables (`GEMINI_API_KEY` as key fallback)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: non_empty(ENV_API_KEY).or_else(|| non_empty(ENV_API_KEY_FALLBACK)),
            model: non_empty(ENV_MODEL).unwrap_or(defaults.model),
            base_url: non_empty(ENV_BASE_URL).unwrap_or(defaults.base_url),
            timeout: defaults.timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self
    }
}
