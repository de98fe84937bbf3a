//! CLI command implementations.

mod auth;
mod notifications;

pub use auth::{login, logout, status};
pub use notifications::{count, list, mark_all_read, mark_read, watch};

use crate::output::OutputFormat;
use crate::session_file;
use anyhow::Result;
use board_config_and_utils::{Config, Paths};
use board_http::ApiClient;
use board_realtime::{RealtimeClient, RealtimeConfig};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs: configuration and a client carrying the
/// saved session.
pub struct Context {
    pub config: Config,
    pub paths: Paths,
    pub client: ApiClient,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(config: Config, paths: Paths, format: OutputFormat) -> Result<Self> {
        let client = ApiClient::new(
            config.api_base_url()?,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        session_file::restore(&paths.session_file(), &client)?;

        Ok(Self {
            config,
            paths,
            client,
            format,
        })
    }

    /// Persist whatever cookies the server left in the jar.
    pub fn save_session(&self) -> Result<()> {
        session_file::save(&self.paths.session_file(), &self.client)
    }

    /// Socket client authenticated with this context's cookies.
    pub fn realtime(&self) -> Result<RealtimeClient> {
        let config = RealtimeConfig {
            url: self.config.socket_url()?,
            max_reconnect_attempts: self.config.reconnect_max_attempts,
            reconnect_base_interval: Duration::from_millis(self.config.reconnect_base_interval_ms),
        };
        Ok(RealtimeClient::with_auth(config, Arc::new(self.client.clone())))
    }
}
