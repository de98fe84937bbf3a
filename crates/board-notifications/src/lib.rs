//! Notification reconciliation for the job-board client.
//!
//! [`NotificationCenter`] folds paginated REST fetches and socket pushes
//! into one de-duplicated collection, newest first, tracks the unread
//! count, and applies read receipts optimistically with rollback.

mod backend;
mod center;
mod merge;

#[cfg(test)]
mod tests;

pub use backend::{
    NotificationBackend, NotificationCallback, RealtimeLink, StateCallback, UnreadCallback,
};
pub use center::{NotificationCenter, NotificationView, DEFAULT_PAGE_SIZE};
pub use merge::{insert_sorted, merge_notifications};
