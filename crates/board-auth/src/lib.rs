//! Session state and authentication flows for the job-board client.
//!
//! - [`SessionStore`]: the observable session record
//! - [`AuthBootstrapper`]: the run-once "who am I" check at startup
//! - [`SessionActions`]: explicit login / logout
//!
//! The HTTP layer is reached through the [`AuthBackend`] trait, implemented
//! for [`board_http::ApiClient`].

mod actions;
mod backend;
mod bootstrap;
mod error;
pub mod fsm;
mod store;

#[cfg(test)]
mod tests;

pub use actions::SessionActions;
pub use backend::AuthBackend;
pub use bootstrap::{
    AuthBootstrapper, BootstrapOutcome, AUTH_FAILED_MESSAGE, SERVER_UNREACHABLE_MESSAGE,
};
pub use error::{AuthError, AuthResult};
pub use fsm::BootstrapPhase;
pub use store::{Session, SessionStore};
