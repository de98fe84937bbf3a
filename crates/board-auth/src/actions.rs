//! Explicit login and logout.

use crate::{AuthBackend, AuthResult, SessionStore};
use board_protocol_types::UserRecord;

/// Login / logout flows that keep the [`SessionStore`] in step with the
/// server.
pub struct SessionActions<B> {
    backend: B,
    store: SessionStore,
}

impl<B: AuthBackend> SessionActions<B> {
    pub fn new(backend: B, store: SessionStore) -> Self {
        Self { backend, store }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sign in. On failure the session carries the server's message.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<UserRecord> {
        self.store.auth_start();
        match self.backend.login(email, password).await {
            Ok(user) => {
                self.store.auth_success(user.clone());
                Ok(user)
            }
            Err(error) => {
                self.store.auth_failure(error.message.clone());
                Err(error.into())
            }
        }
    }

    /// Sign out. The local session is cleared even when the server call
    /// fails; the failure is still returned.
    pub async fn logout(&self) -> AuthResult<()> {
        let result = self.backend.logout().await;
        self.store.logout();

        if let Err(error) = &result {
            tracing::warn!(error = %error, "Server logout failed, local session cleared");
        }
        Ok(result?)
    }
}
