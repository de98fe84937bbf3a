//! User records returned by the auth endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side identifier. The API emits integers for most tables, but
/// string ids (UUIDs, slugs) are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(value) => write!(f, "{}", value),
            RecordId::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        RecordId::Int(value.into())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Str(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Str(value)
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::convert::Infallible;

    /// Numeric input becomes `Int`, anything else `Str`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(RecordId::Int)
            .unwrap_or_else(|_| RecordId::Str(s.to_string())))
    }
}

/// Account role on the job board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    JobSeeker,
    JobProvider,
    Admin,
    #[default]
    #[serde(other)]
    Other,
}

/// Profile of the signed-in user (`GET /auth/profile/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: RecordId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "user_type")]
    pub role: UserRole,
    /// Fields this client does not model (company, avatar, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// Name for display, falling back to the email address.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
