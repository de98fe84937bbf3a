//! Cookie-session REST client.
//!
//! All requests share one cookie jar. The anti-forgery token the server sets
//! in the `csrftoken` cookie is echoed back as `X-CSRFToken` on every
//! request. A 401 triggers at most one session refresh (shared with every
//! other request failing at the same time) followed by a single replay.

use crate::{ApiError, ApiResult, RefreshGate};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header the anti-forgery token is sent in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const REFRESH_PATH: &str = "auth/token/refresh/";

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Refresh the session and replay once on a 401.
    pub refresh_on_unauthorized: bool,
    pub query: Vec<(String, String)>,
    /// Overrides the client-wide timeout.
    pub timeout: Option<Duration>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            refresh_on_unauthorized: true,
            query: Vec::new(),
            timeout: None,
        }
    }
}

impl RequestConfig {
    /// A request that surfaces 401s as-is.
    pub fn no_refresh() -> Self {
        Self {
            refresh_on_unauthorized: false,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// REST client for the job-board API.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
    refresh_gate: RefreshGate,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `https://jobs.example.com/api/`).
    pub fn new(base_url: Url, timeout: Duration) -> ApiResult<Self> {
        Self::with_cookie_jar(base_url, timeout, Arc::new(Jar::default()))
    }

    /// Create a client over an existing cookie jar.
    pub fn with_cookie_jar(base_url: Url, timeout: Duration, cookies: Arc<Jar>) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: with_trailing_slash(base_url),
            cookies,
            refresh_gate: RefreshGate::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookies
    }

    pub fn refresh_gate(&self) -> &RefreshGate {
        &self.refresh_gate
    }

    /// Resolve an API path (`notifications/count/`) against the base URL.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::network(format!("Invalid request URL {}: {}", path, e)))
    }

    /// Current anti-forgery token, if the server has set one.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookie_value(&self.base_url, CSRF_COOKIE)
    }

    /// `Cookie` header value the jar would send to `url`. WebSocket schemes
    /// are matched as their HTTP equivalents.
    pub fn cookie_header_for(&self, url: &Url) -> Option<String> {
        let mut lookup = url.clone();
        let scheme = match url.scheme() {
            "wss" => Some("https"),
            "ws" => Some("http"),
            _ => None,
        };
        if let Some(scheme) = scheme {
            // ws/wss and http/https are both "special" schemes, so this cannot fail.
            let _ = lookup.set_scheme(scheme);
        }

        self.cookies
            .cookies(&lookup)
            .and_then(|value| value.to_str().ok().map(String::from))
    }

    fn cookie_value(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.cookie_header_for(url)?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Issue a request and decode the JSON payload.
    ///
    /// Network failures are returned immediately. A 401 with
    /// `refresh_on_unauthorized` set goes through the shared refresh and
    /// the request is replayed once; if the refresh fails the original 401
    /// is returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        config: &RequestConfig,
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        let observed = self.refresh_gate.generation();

        let response = self.send(method.clone(), &url, body, config).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !config.refresh_on_unauthorized {
            return Self::decode(response).await;
        }

        let original = Self::error_from(response).await.with_refresh_attempted();
        tracing::debug!(method = %method, path = %path, "Unauthorized, refreshing session");

        if let Err(refresh_error) = self.refresh(Some(observed)).await {
            tracing::warn!(
                path = %path,
                status = %refresh_error.status,
                error = %refresh_error,
                "Session refresh failed"
            );
            return Err(original);
        }

        let replay = self
            .send(method, &url, body, config)
            .await
            .map_err(ApiError::with_refresh_attempted)?;
        Self::decode(replay)
            .await
            .map_err(ApiError::with_refresh_attempted)
    }

    /// Refresh the session through the shared gate, joining any refresh
    /// already in flight.
    pub async fn refresh_session(&self) -> ApiResult<()> {
        self.refresh(None).await
    }

    async fn refresh(&self, observed: Option<u64>) -> ApiResult<()> {
        let client = self.clone();
        self.refresh_gate
            .refresh(observed, move || client.post_refresh())
            .await
    }

    async fn post_refresh(self) -> ApiResult<()> {
        let url = self.endpoint(REFRESH_PATH)?;
        let response = self
            .send(Method::POST, &url, None, &RequestConfig::no_refresh())
            .await?;
        Self::decode::<serde_json::Value>(response).await?;
        tracing::info!("Session refreshed");
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        config: &RequestConfig,
    ) -> ApiResult<Response> {
        let mut request = self
            .http_client
            .request(method, url.clone())
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = self.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        if !config.query.is_empty() {
            request = request.query(&config.query);
        }
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "Request failed without a response");
            ApiError::from(e)
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        let bytes = response.bytes().await?;
        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(payload).map_err(|e| ApiError::invalid_body(status.as_u16(), &e))
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.bytes().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);
        tracing::debug!(status, message = %error.message, "Request rejected");
        error
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://jobs.example.com/api");
        assert_eq!(
            client.endpoint("/notifications/count/").unwrap().as_str(),
            "https://jobs.example.com/api/notifications/count/"
        );
    }

    #[test]
    fn test_csrf_token_read_from_jar() {
        let client = client("https://jobs.example.com/api/");
        assert_eq!(client.csrf_token(), None);

        let url = Url::parse("https://jobs.example.com/").unwrap();
        client
            .cookie_jar()
            .add_cookie_str("csrftoken=tok123; Path=/", &url);
        client
            .cookie_jar()
            .add_cookie_str("sessionid=abc; Path=/", &url);

        assert_eq!(client.csrf_token().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_cookie_header_for_websocket_url() {
        let client = client("https://jobs.example.com/api/");
        let url = Url::parse("https://jobs.example.com/").unwrap();
        client
            .cookie_jar()
            .add_cookie_str("sessionid=abc; Path=/", &url);

        let socket = Url::parse("wss://jobs.example.com/ws/notifications/").unwrap();
        let header = client.cookie_header_for(&socket).unwrap();
        assert!(header.contains("sessionid=abc"));
    }
}
