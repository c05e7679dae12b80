use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetch::{FetchOptions, DEFAULT_REVIEW_CONCURRENCY};
use crate::github::DEFAULT_API_BASE_URL;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// api_base_url: "https://api.github.com"
/// review_concurrency: 10
/// fetch_timeout: "20s"
/// theme: auto
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub REST API root, without a trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Maximum review requests in flight per repository
    #[serde(default = "default_review_concurrency")]
    pub review_concurrency: usize,

    /// Per-view load timeout, humantime format ("20s", "1m")
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,

    #[serde(default)]
    pub theme: ThemeMode,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_review_concurrency() -> usize {
    DEFAULT_REVIEW_CONCURRENCY
}

fn default_fetch_timeout() -> String {
    "20s".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            review_concurrency: default_review_concurrency(),
            fetch_timeout: default_fetch_timeout(),
            theme: ThemeMode::default(),
        }
    }
}

impl Config {
    /// Parsed `fetch_timeout`. Falls back to 20s if the value is invalid;
    /// `validate_config` reports it separately.
    pub fn fetch_timeout(&self) -> Duration {
        humantime::parse_duration(&self.fetch_timeout).unwrap_or(Duration::from_secs(20))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            review_concurrency: self.review_concurrency.max(1),
        }
    }
}

/// Palette selection; `auto` asks the terminal for its background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}
