//! Session cookies persisted between CLI invocations.
//!
//! The server keeps the session in cookies; each `jobboard-notify` run
//! starts with an empty jar, so the cookies the API origin would receive are
//! saved after every command and replayed into the next run's jar.

use anyhow::{Context, Result};
use board_http::ApiClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use url::Url;

#[derive(Debug, Serialize, Deserialize)]
struct SavedSession {
    origin: String,
    cookie: String,
    saved_at: DateTime<Utc>,
}

fn origin_of(client: &ApiClient) -> Url {
    let mut origin = client.base_url().clone();
    origin.set_path("/");
    origin.set_query(None);
    origin
}

/// Load saved cookies into `client`'s jar. Returns whether anything was
/// restored; cookies saved for another origin are ignored.
pub fn restore(path: &Path, client: &ApiClient) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let saved: SavedSession = match serde_json::from_str(&content) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            return Ok(false);
        }
    };

    let origin = origin_of(client);
    if saved.origin != origin.as_str() {
        tracing::debug!(saved = %saved.origin, current = %origin, "Session saved for another server");
        return Ok(false);
    }

    for pair in saved.cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        client
            .cookie_jar()
            .add_cookie_str(&format!("{}; Path=/", pair), &origin);
    }
    tracing::debug!(saved_at = %saved.saved_at, "Restored session cookies");
    Ok(true)
}

/// Save the cookies the API origin would receive, or remove the file when
/// there are none.
pub fn save(path: &Path, client: &ApiClient) -> Result<()> {
    let origin = origin_of(client);
    let Some(cookie) = client.cookie_header_for(&origin) else {
        return clear(path);
    };

    let saved = SavedSession {
        origin: origin.to_string(),
        cookie,
        saved_at: Utc::now(),
    };
    let content = serde_json::to_string_pretty(&saved)?;
    write_private(path, content.as_bytes())
        .with_context(|| format!("Failed to write session file {}", path.display()))
}

/// Write through a sibling temp file created owner-only, then rename it over
/// `path`. Readers see either the old session or the new one.
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session.json".to_string());
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let result = (|| -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

pub fn clear(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
