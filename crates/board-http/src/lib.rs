//! REST client for the job-board API.
//!
//! [`ApiClient`] wraps a cookie-session `reqwest` client with:
//!
//! - anti-forgery header injection from the `csrftoken` cookie
//! - one shared session refresh on 401, then a single replay ([`RefreshGate`])
//! - error normalization into [`ApiError`]
//!
//! ```ignore
//! let client = ApiClient::new(config.api_base_url()?, Duration::from_secs(30))?;
//! let unread = client.unread_count().await?;
//! ```

mod client;
mod endpoints;
mod error;
mod refresh;

#[cfg(test)]
mod tests;

pub use client::{ApiClient, RequestConfig, CSRF_COOKIE, CSRF_HEADER};
pub use error::{ApiError, ApiResult, ErrorKind, ErrorStatus, FALLBACK_MESSAGE};
pub use refresh::RefreshGate;
pub use reqwest::Method;
