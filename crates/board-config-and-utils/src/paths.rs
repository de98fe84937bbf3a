//! Where the client keeps its files.
//!
//! ```text
//! ~/.jobboard/            (or $JOBBOARD_HOME)
//!   config.json
//!   session.json          saved session cookies, mode 0600
//!   logs/client.jsonl
//! ```

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "JOBBOARD_HOME";
const BASE_DIR_NAME: &str = ".jobboard";
const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";
const LOGS_DIR: &str = "logs";
const CLIENT_LOG_FILE: &str = "client.jsonl";

#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// `$JOBBOARD_HOME` if set and non-empty, otherwise `~/.jobboard`.
    pub fn new() -> CoreResult<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(home)));
        }
        let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
        Ok(Self::with_base_dir(home.join(BASE_DIR_NAME)))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join(LOGS_DIR)
    }

    pub fn client_log_file(&self) -> PathBuf {
        self.logs_dir().join(CLIENT_LOG_FILE)
    }

    /// Create the base and log directories if missing.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_under_base_dir() {
        let base = PathBuf::from("/tmp/jobboard-test");
        let paths = Paths::with_base_dir(base.clone());

        assert_eq!(paths.base_dir(), base.as_path());
        assert_eq!(paths.config_file(), base.join("config.json"));
        assert_eq!(paths.session_file(), base.join("session.json"));
        assert_eq!(paths.client_log_file(), base.join("logs/client.jsonl"));
    }

    #[test]
    fn test_ensure_dirs_is_idempotent() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("jobboard");
        let paths = Paths::with_base_dir(base.clone());
        assert!(!base.exists());

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(base.is_dir());
        assert!(paths.logs_dir().is_dir());
    }
}
