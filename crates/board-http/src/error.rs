//! Normalized API errors.
//!
//! Every failed request, whatever its cause, ends up as an [`ApiError`] with a
//! single human-readable message, a status, and any per-field validation
//! messages the server returned.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Message used when nothing more specific is available.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Where an error came from: an HTTP status or a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    Http(u16),
    /// No response was received (refused, timed out, DNS, TLS, ...).
    NetworkError,
}

impl ErrorStatus {
    pub fn code(&self) -> Option<u16> {
        match self {
            ErrorStatus::Http(code) => Some(*code),
            ErrorStatus::NetworkError => None,
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStatus::Http(code) => write!(f, "{}", code),
            ErrorStatus::NetworkError => f.write_str("network_error"),
        }
    }
}

impl Serialize for ErrorStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorStatus::Http(code) => serializer.serialize_u16(*code),
            ErrorStatus::NetworkError => serializer.serialize_str("network_error"),
        }
    }
}

/// Coarse classification used by callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Client,
    Server,
}

/// A normalized request failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: ErrorStatus,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    refresh_attempted: bool,
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(message: impl Into<String>, status: ErrorStatus) -> Self {
        Self {
            message: message.into(),
            status,
            field_errors: BTreeMap::new(),
            refresh_attempted: false,
        }
    }

    /// A transport failure. An empty description falls back to the generic
    /// message.
    pub fn network(description: impl Into<String>) -> Self {
        let description = description.into();
        let message = if description.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            description
        };
        Self::new(message, ErrorStatus::NetworkError)
    }

    /// Build an error from a non-success HTTP response body.
    ///
    /// Message precedence: `non_field_errors[0]`, then `detail`, then the
    /// first field error (`email` before the others), then the generic
    /// "Request failed with status code N".
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<serde_json::Value>(body).ok();
        let object = parsed.as_ref().and_then(|value| value.as_object());

        let mut field_errors = BTreeMap::new();
        let mut non_field = None;

        if let Some(object) = object {
            non_field = object
                .get("non_field_errors")
                .and_then(first_message)
                .or_else(|| object.get("detail").and_then(|d| d.as_str()).map(String::from))
                .filter(|message| !message.is_empty());

            for (key, value) in object {
                if key == "non_field_errors" || key == "detail" {
                    continue;
                }
                let messages = messages_of(value);
                if !messages.is_empty() {
                    field_errors.insert(key.clone(), messages);
                }
            }
        }

        let field_message = field_errors
            .get("email")
            .or_else(|| field_errors.values().next())
            .and_then(|messages| messages.first())
            .cloned();

        let message = non_field
            .or(field_message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        Self {
            message,
            status: ErrorStatus::Http(status),
            field_errors,
            refresh_attempted: false,
        }
    }

    /// A success response whose body could not be decoded.
    pub fn invalid_body(status: u16, error: &serde_json::Error) -> Self {
        Self::new(
            format!("Invalid response body: {}", error),
            ErrorStatus::Http(status),
        )
    }

    /// Mark that the client already spent its one refresh on this request.
    pub fn with_refresh_attempted(mut self) -> Self {
        self.refresh_attempted = true;
        self
    }

    /// Whether a token refresh was already attempted before this error was
    /// returned.
    pub fn refresh_attempted(&self) -> bool {
        self.refresh_attempted
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == ErrorStatus::Http(401)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status {
            ErrorStatus::NetworkError => ErrorKind::Network,
            ErrorStatus::Http(401) => ErrorKind::Auth,
            ErrorStatus::Http(code) if (400..500).contains(&code) => {
                if self.field_errors.is_empty() {
                    ErrorKind::Client
                } else {
                    ErrorKind::Validation
                }
            }
            ErrorStatus::Http(_) => ErrorKind::Server,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::network(err.to_string())
    }
}

fn first_message(value: &serde_json::Value) -> Option<String> {
    messages_of(value).into_iter().next()
}

fn messages_of(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(message) => vec![message.clone()],
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}
