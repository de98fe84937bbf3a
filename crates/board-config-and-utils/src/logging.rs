//! Logging bootstrap for the `jobboard-notify` binary.
//!
//! Compact logs go to stderr; with `write_file`, JSONL is also appended to
//! `logs/client.jsonl` under the client's base directory. `RUST_LOG`
//! overrides the level given here.

use crate::Paths;
use tracing::Level;

const SERVICE_NAME: &str = "jobboard-notify";

/// ```ignore
/// init_logging("info", true);
/// tracing::info!("Client started");
/// ```
pub fn init_logging(level: &str, write_file: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        write_file,
        log_path: Paths::new().ok().map(|paths| paths.client_log_file()),
        also_stderr: true,
    });
}

/// Parse a level name, accepting `warning` for `warn`. Anything
/// unrecognized means `info`.
pub fn parse_level(level: &str) -> Level {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return Level::WARN;
    }
    level.parse().unwrap_or(Level::INFO)
}
