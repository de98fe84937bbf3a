//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base URL (can be overridden at compile time via JOBBOARD_API_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("JOBBOARD_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000/api",
};

/// Default WebSocket host (compile-time JOBBOARD_WS_HOST). When unset, the
/// socket connects to the API host.
pub const DEFAULT_WS_HOST: Option<&str> = option_env!("JOBBOARD_WS_HOST");

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default notification page size.
pub const DEFAULT_NOTIFICATION_PAGE_SIZE: u32 = 20;

/// Default number of automatic reconnect attempts.
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_RECONNECT_BASE_INTERVAL_MS: u64 = 3000;

const NOTIFICATION_SOCKET_PATH: &str = "/ws/notifications/";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// REST API base URL, e.g. `https://jobs.example.com/api`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// WebSocket host (`host[:port]`), defaults to the API host.
    #[serde(default = "default_ws_host")]
    pub ws_host: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_notification_page_size")]
    pub notification_page_size: u32,
    #[serde(default = "default_reconnect_max_attempts")]
    pub reconnect_max_attempts: u32,
    #[serde(default = "default_reconnect_base_interval_ms")]
    pub reconnect_base_interval_ms: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_ws_host() -> Option<String> {
    DEFAULT_WS_HOST.map(|s| s.to_string())
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_notification_page_size() -> u32 {
    DEFAULT_NOTIFICATION_PAGE_SIZE
}

fn default_reconnect_max_attempts() -> u32 {
    DEFAULT_RECONNECT_MAX_ATTEMPTS
}

fn default_reconnect_base_interval_ms() -> u64 {
    DEFAULT_RECONNECT_BASE_INTERVAL_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_base_url: default_api_base_url(),
            ws_host: default_ws_host(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notification_page_size: DEFAULT_NOTIFICATION_PAGE_SIZE,
            reconnect_max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
            reconnect_base_interval_ms: DEFAULT_RECONNECT_BASE_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| CoreError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `JOBBOARD_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = non_empty("JOBBOARD_API_URL") {
            self.api_base_url = url;
        }
        if let Some(host) = non_empty("JOBBOARD_WS_HOST") {
            self.ws_host = Some(host);
        }
        if let Some(level) = non_empty("JOBBOARD_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// The API base URL, normalized to end with `/` so relative joins keep
    /// its path prefix.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        let mut url = Url::parse(&self.api_base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// The notification socket URL: `ws(s)://<host>/ws/notifications/`.
    ///
    /// The scheme follows the API base URL (`https` → `wss`).
    pub fn socket_url(&self) -> CoreResult<Url> {
        let api = self.api_base_url()?;
        let scheme = match api.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => return Err(CoreError::UnsupportedScheme(other.to_string())),
        };

        let host = match &self.ws_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let host = api
                    .host_str()
                    .ok_or_else(|| CoreError::MissingHost(api.to_string()))?;
                match api.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                }
            }
        };

        Ok(Url::parse(&format!(
            "{}://{}{}",
            scheme, host, NOTIFICATION_SOCKET_PATH
        ))?)
    }
}
