//! Realtime notification socket for the job-board client.
//!
//! This crate provides:
//! - one shared WebSocket connection to `/ws/notifications/`
//! - automatic reconnection with bounded geometric backoff
//! - typed listener registration for pushed notifications and state changes
//! - read receipts sent over the socket

mod client;
mod error;
mod listeners;
mod messages;
mod policy;

#[cfg(test)]
mod tests;

pub use client::{ConnectionState, HandshakeAuth, RealtimeClient, RealtimeConfig};
pub use error::{RealtimeError, RealtimeResult};
pub use listeners::{Listeners, Subscription};
pub use messages::{OutboundFrame, ServerFrame};
pub use policy::ReconnectPolicy;
