use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Widget settings.
///
/// Read from `~/.chatpane/config.json`, then overridden key-by-key by a
/// project-local `.chatpane.json`:
/// ```json
/// {
///   "model": "claude-3-5-sonnet-20241022",
///   "max_tokens": 1000,
///   "base_url": "https://api.anthropic.com",
///   "request_timeout_secs": 120
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Token budget sent as `max_tokens`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Endpoint root; `/v1/messages` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Seconds before an unanswered request settles as a transport failure.
    /// `0` waits forever.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Key-value file holding the API key.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Assistant turn appended when a request fails.
    #[serde(default = "default_failure_notice")]
    pub failure_notice: String,
    /// `tracing` filter used when `CHATPANE_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_FAILURE_NOTICE: &str = "Sorry, something went wrong. Please try again.";

fn default_model() -> String {
    std::env::var("CHATPANE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_base_url() -> String {
    std::env::var("CHATPANE_BASE_URL").unwrap_or_else(|_| "https://api.anthropic.com".to_string())
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_store_path() -> PathBuf {
    WidgetConfig::resolve_path("store.json")
}

fn default_failure_notice() -> String {
    DEFAULT_FAILURE_NOTICE.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            request_timeout_secs: default_request_timeout_secs(),
            store_path: default_store_path(),
            failure_notice: default_failure_notice(),
            log_filter: default_log_filter(),
        }
    }
}

impl WidgetConfig {
    pub fn load() -> Result<Self> {
        let local = std::env::current_dir()
            .ok()
            .map(|d| d.join(".chatpane.json"));
        Self::load_from(&Self::resolve_path("config.json"), local.as_deref())
    }

    /// Loads `global` (or defaults when absent) and merges the top-level keys
    /// of `local` over it.
    pub fn load_from(global: &std::path::Path, local: Option<&std::path::Path>) -> Result<Self> {
        let mut config = if global.exists() {
            let data = std::fs::read_to_string(global)?;
            serde_json::from_str::<WidgetConfig>(&data)?
        } else {
            WidgetConfig::default()
        };

        if let Ok(model) = std::env::var("CHATPANE_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("CHATPANE_BASE_URL") {
            config.base_url = url;
        }

        if let Some(local) = local.filter(|p| p.exists()) {
            let data = std::fs::read_to_string(local)?;
            let override_val: serde_json::Value = serde_json::from_str(&data)?;
            let mut base = serde_json::to_value(&config)?;
            if let (Some(base_obj), Some(over_obj)) =
                (base.as_object_mut(), override_val.as_object())
            {
                for (k, v) in over_obj {
                    base_obj.insert(k.clone(), v.clone());
                }
            }
            config = serde_json::from_value(base)?;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn resolve_path(relative: &str) -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chatpane")
            .join(relative)
    }
}
