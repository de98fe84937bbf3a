//! Bootstrap state machine.
//!
//! ```text
//!   Init
//!    │ Check
//!    ▼
//!  Checking ──ProfileLoaded──► Authenticated
//!    │   └──────Rejected─────► Unauthenticated
//!    │ Unauthorized                ▲
//!    ▼                             │ Rejected
//!  Refreshing ──ProfileLoaded──► Authenticated
//! ```
//!
//! `Authenticated` and `Unauthenticated` are terminal: the bootstrap runs
//! once per process.

use rust_fsm::*;
use serde::Serialize;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub bootstrap_machine(Init)

    Init => {
        Check => Checking
    },
    Checking => {
        ProfileLoaded => Authenticated,
        Unauthorized => Refreshing,
        Rejected => Unauthenticated
    },
    Refreshing => {
        ProfileLoaded => Authenticated,
        Rejected => Unauthenticated
    }
}

pub use bootstrap_machine::Input as BootstrapInput;
pub use bootstrap_machine::State as BootstrapState;
pub use bootstrap_machine::StateMachine as BootstrapMachine;

/// Public view of the bootstrap progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPhase {
    Init,
    Checking,
    Refreshing,
    Authenticated,
    Unauthenticated,
}

impl BootstrapPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BootstrapPhase::Authenticated | BootstrapPhase::Unauthenticated
        )
    }
}

impl From<&BootstrapState> for BootstrapPhase {
    fn from(state: &BootstrapState) -> Self {
        match state {
            BootstrapState::Init => BootstrapPhase::Init,
            BootstrapState::Checking => BootstrapPhase::Checking,
            BootstrapState::Refreshing => BootstrapPhase::Refreshing,
            BootstrapState::Authenticated => BootstrapPhase::Authenticated,
            BootstrapState::Unauthenticated => BootstrapPhase::Unauthenticated,
        }
    }
}
