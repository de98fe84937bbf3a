//! The HTTP operations the auth flows depend on.

use async_trait::async_trait;
use board_http::{ApiClient, ApiResult};
use board_protocol_types::UserRecord;

/// Auth endpoints, abstracted so flows can run against fakes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `GET /auth/profile/`, subject to the client's own 401 handling.
    async fn fetch_profile(&self) -> ApiResult<UserRecord>;

    /// One session refresh, shared with any refresh already in flight.
    async fn refresh_session(&self) -> ApiResult<()>;

    async fn login(&self, email: &str, password: &str) -> ApiResult<UserRecord>;

    async fn logout(&self) -> ApiResult<()>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn fetch_profile(&self) -> ApiResult<UserRecord> {
        self.get_profile().await
    }

    async fn refresh_session(&self) -> ApiResult<()> {
        ApiClient::refresh_session(self).await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        ApiClient::login(self, email, password).await
    }

    async fn logout(&self) -> ApiResult<()> {
        ApiClient::logout(self).await
    }
}
