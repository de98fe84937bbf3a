//! Run-once authentication check.
//!
//! On startup the client asks the server who it is. The answer decides the
//! initial [`Session`](crate::Session):
//!
//! - profile loads: authenticated
//! - no response at all: unauthenticated, "server unreachable", no refresh
//! - 401: one shared session refresh and one re-fetch, unless the HTTP
//!   client already spent its refresh on the original request
//! - anything else: unauthenticated
//!
//! Whatever happens, `auth_checked` ends up true. Later or concurrent calls
//! to [`AuthBootstrapper::run`] observe the first run's outcome.

use crate::fsm::{BootstrapInput, BootstrapMachine, BootstrapPhase};
use crate::{AuthBackend, AuthError, AuthResult, SessionStore};
use board_http::ErrorKind;
use board_protocol_types::UserRecord;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

pub const SERVER_UNREACHABLE_MESSAGE: &str =
    "Server unreachable. Please check your connection and try again.";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// How the bootstrap ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    Authenticated(UserRecord),
    Unauthenticated { message: String },
}

impl BootstrapOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, BootstrapOutcome::Authenticated(_))
    }

    fn rejected(message: &str) -> Self {
        BootstrapOutcome::Unauthenticated {
            message: message.to_string(),
        }
    }
}

pub struct AuthBootstrapper<B> {
    backend: B,
    store: SessionStore,
    outcome: OnceCell<BootstrapOutcome>,
    machine: Mutex<BootstrapMachine>,
}

impl<B: AuthBackend> AuthBootstrapper<B> {
    pub fn new(backend: B, store: SessionStore) -> Self {
        Self {
            backend,
            store,
            outcome: OnceCell::new(),
            machine: Mutex::new(BootstrapMachine::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn phase(&self) -> BootstrapPhase {
        BootstrapPhase::from(self.machine.lock().state())
    }

    /// Whether a bootstrap has completed.
    pub fn has_run(&self) -> bool {
        self.outcome.initialized()
    }

    /// Run the bootstrap, or wait for / return the first run's outcome.
    pub async fn run(&self) -> BootstrapOutcome {
        self.outcome.get_or_init(|| self.bootstrap()).await.clone()
    }

    async fn bootstrap(&self) -> BootstrapOutcome {
        self.advance(BootstrapInput::Check);
        self.store.auth_start();

        let outcome = match self.backend.fetch_profile().await {
            Ok(user) => BootstrapOutcome::Authenticated(user),
            Err(error) if error.kind() == ErrorKind::Network => {
                tracing::warn!(error = %error, "Auth check could not reach the server");
                BootstrapOutcome::rejected(SERVER_UNREACHABLE_MESSAGE)
            }
            Err(error) if error.is_unauthorized() && !error.refresh_attempted() => {
                self.refresh_and_refetch().await
            }
            Err(error) => {
                tracing::info!(
                    status = %error.status,
                    refresh_attempted = error.refresh_attempted(),
                    error = %error,
                    "Auth check rejected"
                );
                BootstrapOutcome::rejected(AUTH_FAILED_MESSAGE)
            }
        };

        match &outcome {
            BootstrapOutcome::Authenticated(user) => {
                self.advance(BootstrapInput::ProfileLoaded);
                self.store.auth_success(user.clone());
            }
            BootstrapOutcome::Unauthenticated { message } => {
                self.advance(BootstrapInput::Rejected);
                self.store.auth_failure(message.clone());
            }
        }

        outcome
    }

    async fn refresh_and_refetch(&self) -> BootstrapOutcome {
        self.advance(BootstrapInput::Unauthorized);
        self.store.refresh_started();

        if let Err(error) = self.backend.refresh_session().await {
            tracing::warn!(error = %error, "Session refresh during auth check failed");
            self.store.refresh_failed(AUTH_FAILED_MESSAGE);
            return BootstrapOutcome::rejected(AUTH_FAILED_MESSAGE);
        }
        self.store.refresh_succeeded();

        match self.backend.fetch_profile().await {
            Ok(user) => BootstrapOutcome::Authenticated(user),
            Err(error) => {
                tracing::warn!(error = %error, "Profile still unavailable after refresh");
                BootstrapOutcome::rejected(AUTH_FAILED_MESSAGE)
            }
        }
    }

    fn advance(&self, input: BootstrapInput) {
        if let Err(error) = self.try_advance(&input) {
            tracing::warn!(error = %error, "Ignoring bootstrap transition");
        }
    }

    fn try_advance(&self, input: &BootstrapInput) -> AuthResult<BootstrapPhase> {
        let mut machine = self.machine.lock();
        let from = BootstrapPhase::from(machine.state());
        machine.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!("Cannot apply {:?} in state {:?}", input, from))
        })?;
        let to = BootstrapPhase::from(machine.state());
        tracing::debug!(from = ?from, to = ?to, "Bootstrap transition");
        Ok(to)
    }
}
