//! Seams between the notification center and its transports.

use async_trait::async_trait;
use board_http::{ApiClient, ApiResult};
use board_protocol_types::{Notification, NotificationId, NotificationPage};
use board_realtime::{ConnectionState, RealtimeClient, Subscription};

/// REST operations on the notification endpoints.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn fetch_page(&self, page: u32, page_size: u32) -> ApiResult<NotificationPage>;

    async fn fetch_unread_count(&self) -> ApiResult<u64>;

    async fn mark_read(&self, id: &NotificationId) -> ApiResult<()>;

    async fn mark_all_read(&self) -> ApiResult<()>;
}

#[async_trait]
impl NotificationBackend for ApiClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> ApiResult<NotificationPage> {
        self.list_notifications(page, page_size).await
    }

    async fn fetch_unread_count(&self) -> ApiResult<u64> {
        self.unread_count().await
    }

    async fn mark_read(&self, id: &NotificationId) -> ApiResult<()> {
        self.mark_notification_read(id).await
    }

    async fn mark_all_read(&self) -> ApiResult<()> {
        self.mark_all_notifications_read().await
    }
}

pub type NotificationCallback = Box<dyn Fn(&Notification) + Send + Sync>;
pub type UnreadCallback = Box<dyn Fn(&Vec<Notification>) + Send + Sync>;
pub type StateCallback = Box<dyn Fn(&ConnectionState) + Send + Sync>;

/// The realtime connection as the notification center sees it.
pub trait RealtimeLink: Send + Sync {
    fn connect(&self);

    fn disconnect(&self);

    fn status(&self) -> ConnectionState;

    /// Returns false when nothing was sent.
    fn mark_as_read(&self, id: &NotificationId) -> bool;

    fn mark_all_as_read(&self) -> bool;

    fn on_notification(&self, callback: NotificationCallback) -> Subscription;

    fn on_unread_notifications(&self, callback: UnreadCallback) -> Subscription;

    fn on_connection_change(&self, callback: StateCallback) -> Subscription;
}

impl RealtimeLink for RealtimeClient {
    fn connect(&self) {
        RealtimeClient::connect(self)
    }

    fn disconnect(&self) {
        RealtimeClient::disconnect(self)
    }

    fn status(&self) -> ConnectionState {
        RealtimeClient::status(self)
    }

    fn mark_as_read(&self, id: &NotificationId) -> bool {
        RealtimeClient::mark_as_read(self, id)
    }

    fn mark_all_as_read(&self) -> bool {
        RealtimeClient::mark_all_as_read(self)
    }

    fn on_notification(&self, callback: NotificationCallback) -> Subscription {
        RealtimeClient::on_notification(self, callback)
    }

    fn on_unread_notifications(&self, callback: UnreadCallback) -> Subscription {
        RealtimeClient::on_unread_notifications(self, callback)
    }

    fn on_connection_change(&self, callback: StateCallback) -> Subscription {
        RealtimeClient::on_connection_change(self, callback)
    }
}
