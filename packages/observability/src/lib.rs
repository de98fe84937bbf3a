//! # Observability
//!
//! Logging bootstrap for the job-board client crates.
//!
//! Library crates only emit `tracing` events. The binary calls
//! [`init_with_config`] once at startup and decides where those events go:
//!
//! - a compact, human-readable stream on stderr
//! - optionally, structured JSONL appended to a log file
//!   (`~/.jobboard/logs/client.jsonl` by default)
//!
//! `RUST_LOG` always wins over the configured default level.
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "jobboard-notify".into(),
//!         default_level: "debug".into(),
//!         write_file: true,
//!         ..Default::default()
//!     });
//!     tracing::info!("ready");
//! }
//! ```

mod file_writer;
mod json_layer;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use file_writer::{default_log_path, FileLogWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the program, written into every JSONL line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Append structured JSONL to a file.
    pub write_file: bool,

    /// Optional custom log file path, used when `write_file` is set.
    pub log_path: Option<PathBuf>,

    /// Emit the compact human-readable stream on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            write_file: false,
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place. A log file that cannot be opened downgrades to
/// stderr-only logging instead of failing startup.
pub fn init_with_config(config: LogConfig) {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let mut file_error = None;
    let json_layer = if config.write_file {
        let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
        match FileLogWriter::new(&log_path) {
            Ok(writer) => Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                    .with_filter(filter()),
            ),
            Err(e) => {
                file_error = Some(format!("{}: {}", log_path.display(), e));
                None
            }
        }
    } else {
        None
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(filter())
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if let Some(error) = file_error {
        tracing::warn!(error = %error, "Log file unavailable, logging to stderr only");
    }
    if installed {
        tracing::debug!(service = %config.service_name, "observability initialized");
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
