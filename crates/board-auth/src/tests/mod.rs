//! Flow tests against a scripted backend.
//!
//! - `mock.rs`      - scripted `AuthBackend` with call counters
//! - `bootstrap.rs` - run-once auth check outcomes
//! - `actions.rs`   - login / logout

pub(crate) mod mock;
