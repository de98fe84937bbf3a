//! Typed wrappers for the endpoints this client consumes.

use crate::{ApiClient, ApiResult, RequestConfig};
use board_protocol_types::{NotificationId, NotificationPage, UnreadCount, UserRecord};
use reqwest::Method;
use serde::Deserialize;

const PROFILE_PATH: &str = "auth/profile/";
const LOGIN_PATH: &str = "auth/login/";
const LOGOUT_PATH: &str = "auth/logout/";
const NOTIFICATIONS_PATH: &str = "notifications/";
const UNREAD_COUNT_PATH: &str = "notifications/count/";
const MARK_ALL_READ_PATH: &str = "notifications/mark-all-read/";

/// Login answers either with the user itself or wrapped as `{"user": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoginBody {
    Wrapped { user: UserRecord },
    Bare(UserRecord),
}

impl ApiClient {
    /// `GET /auth/profile/`
    pub async fn get_profile(&self) -> ApiResult<UserRecord> {
        self.request(Method::GET, PROFILE_PATH, None, &RequestConfig::default())
            .await
    }

    /// `POST /auth/login/`. Bad credentials come back as a 401/400 without
    /// any refresh attempt.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        let body = serde_json::json!({ "email": email, "password": password });
        let login: LoginBody = self
            .request(Method::POST, LOGIN_PATH, Some(&body), &RequestConfig::no_refresh())
            .await?;

        Ok(match login {
            LoginBody::Wrapped { user } | LoginBody::Bare(user) => user,
        })
    }

    /// `POST /auth/logout/`
    pub async fn logout(&self) -> ApiResult<()> {
        self.request::<serde_json::Value>(
            Method::POST,
            LOGOUT_PATH,
            None,
            &RequestConfig::no_refresh(),
        )
        .await
        .map(|_| ())
    }

    /// `GET /notifications/?page=&page_size=`
    pub async fn list_notifications(&self, page: u32, page_size: u32) -> ApiResult<NotificationPage> {
        let config = RequestConfig::default()
            .with_query("page", page)
            .with_query("page_size", page_size);
        self.request(Method::GET, NOTIFICATIONS_PATH, None, &config)
            .await
    }

    /// `GET /notifications/count/`
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let count: UnreadCount = self
            .request(Method::GET, UNREAD_COUNT_PATH, None, &RequestConfig::default())
            .await?;
        Ok(count.unread_count)
    }

    /// `POST /notifications/mark-read/{id}/`
    pub async fn mark_notification_read(&self, id: &NotificationId) -> ApiResult<()> {
        let path = format!("notifications/mark-read/{}/", id);
        self.request::<serde_json::Value>(Method::POST, &path, None, &RequestConfig::default())
            .await
            .map(|_| ())
    }

    /// `POST /notifications/mark-all-read/`
    pub async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        self.request::<serde_json::Value>(
            Method::POST,
            MARK_ALL_READ_PATH,
            None,
            &RequestConfig::default(),
        )
        .await
        .map(|_| ())
    }
}
