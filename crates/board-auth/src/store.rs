//! Observable session record.

use board_protocol_types::UserRecord;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Who is signed in and where the auth check stands.
///
/// `is_authenticated` implies `user` is set. `auth_checked` only ever goes
/// from false to true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub auth_checked: bool,
}

/// Shared session state. Clones observe and mutate the same session.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Current session value.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated
    }

    /// An auth check or login began.
    pub fn auth_start(&self) {
        self.update(|session| {
            session.loading = true;
            session.error = None;
        });
    }

    pub fn auth_success(&self, user: UserRecord) {
        tracing::info!(user_id = %user.id, "Session authenticated");
        self.update(|session| {
            session.user = Some(user);
            session.is_authenticated = true;
            session.loading = false;
            session.error = None;
            session.auth_checked = true;
        });
    }

    pub fn auth_failure(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(error = %message, "Session not authenticated");
        self.update(|session| {
            session.user = None;
            session.is_authenticated = false;
            session.loading = false;
            session.error = Some(message);
            session.auth_checked = true;
        });
    }

    /// Clear the signed-in user. `auth_checked` is left as it was.
    pub fn logout(&self) {
        self.update(|session| {
            session.user = None;
            session.is_authenticated = false;
            session.loading = false;
            session.error = None;
        });
    }

    pub fn refresh_started(&self) {
        self.update(|session| session.loading = true);
    }

    pub fn refresh_succeeded(&self) {
        self.update(|session| session.error = None);
    }

    /// The session could not be renewed: whoever was signed in no longer is.
    pub fn refresh_failed(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|session| {
            session.user = None;
            session.is_authenticated = false;
            session.loading = false;
            session.error = Some(message);
        });
    }

    /// Apply `mutate`, notifying subscribers only if the value changed.
    fn update(&self, mutate: impl FnOnce(&mut Session)) {
        self.tx.send_if_modified(|session| {
            let before = session.clone();
            mutate(session);
            *session != before
        });
    }
}
