//! Scripted backend.

use crate::AuthBackend;
use async_trait::async_trait;
use board_http::{ApiError, ApiResult};
use board_protocol_types::UserRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replies are consumed in order; an exhausted script answers 401.
#[derive(Default)]
pub struct MockBackend {
    profile: Mutex<VecDeque<ApiResult<UserRecord>>>,
    refresh: Mutex<VecDeque<ApiResult<()>>>,
    login: Mutex<VecDeque<ApiResult<UserRecord>>>,
    logout: Mutex<VecDeque<ApiResult<()>>>,
    delay: Duration,
    pub profile_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, result: ApiResult<UserRecord>) -> Self {
        self.profile.lock().push_back(result);
        self
    }

    pub fn with_refresh(self, result: ApiResult<()>) -> Self {
        self.refresh.lock().push_back(result);
        self
    }

    pub fn with_login(self, result: ApiResult<UserRecord>) -> Self {
        self.login.lock().push_back(result);
        self
    }

    pub fn with_logout(self, result: ApiResult<()>) -> Self {
        self.logout.lock().push_back(result);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn next<T>(queue: &Mutex<VecDeque<ApiResult<T>>>) -> ApiResult<T> {
    queue.lock().pop_front().unwrap_or_else(|| Err(unauthorized()))
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn fetch_profile(&self) -> ApiResult<UserRecord> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        next(&self.profile)
    }

    async fn refresh_session(&self) -> ApiResult<()> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        next(&self.refresh)
    }

    async fn login(&self, _email: &str, _password: &str) -> ApiResult<UserRecord> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.login)
    }

    async fn logout(&self) -> ApiResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.logout)
    }
}

pub fn user() -> UserRecord {
    serde_json::from_value(serde_json::json!({
        "id": 42,
        "email": "sam@example.com",
        "first_name": "Sam",
        "last_name": "Rivera",
        "role": "job_seeker"
    }))
    .unwrap()
}

pub fn unauthorized() -> ApiError {
    ApiError::from_response(
        401,
        br#"{"detail":"Authentication credentials were not provided."}"#,
    )
}

pub fn network_error() -> ApiError {
    ApiError::network("error sending request: connection refused")
}
