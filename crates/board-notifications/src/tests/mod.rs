//! Reconciliation tests against in-process fakes.
//!
//! - `fakes.rs`   - scripted `NotificationBackend` and a drivable `RealtimeLink`
//! - `sync.rs`    - initial load, pushes, re-sync on connect, teardown
//! - `receipts.rs` - optimistic read receipts with socket/REST confirmation
