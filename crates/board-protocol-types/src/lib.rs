//! Wire types shared by the job-board client crates.
//!
//! These types mirror the JSON the REST API and the notification socket
//! exchange. They carry no behavior beyond (de)serialization and a few
//! convenience accessors.

mod notification;
mod user;

pub use notification::{
    Notification, NotificationId, NotificationPage, NotificationType, UnreadCount,
};
pub use user::{RecordId, UserRecord, UserRole};
