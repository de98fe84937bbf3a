//! Errors raised while loading configuration and resolving paths.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The config file exists but could not be read or parsed.
    #[error("Invalid config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported API URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("API URL has no host: {0}")]
    MissingHost(String),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type CoreResult<T> = Result<T, CoreError>;
