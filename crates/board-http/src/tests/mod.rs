//! Integration tests for the REST client against an in-process HTTP server.
//!
//! - `harness.rs`      - mock HTTP server recording every request
//! - `unauthorized.rs` - 401 handling, shared refresh, replay
//! - `requests.rs`     - headers, cookies, query strings, error payloads

pub(crate) mod harness;
mod requests;
