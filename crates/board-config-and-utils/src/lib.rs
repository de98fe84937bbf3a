//! Configuration, paths, logging bootstrap and the core error type shared by
//! the job-board client crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_NOTIFICATION_PAGE_SIZE,
    DEFAULT_RECONNECT_BASE_INTERVAL_MS, DEFAULT_RECONNECT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WS_HOST,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
