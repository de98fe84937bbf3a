//! Socket client tests against an in-process WebSocket server.
//!
//! - `harness.rs`   - mock notification socket and polling helpers
//! - `frames.rs`    - inbound dispatch and outbound read receipts
//! - `lifecycle.rs` - connect, disconnect, reconnect backoff
