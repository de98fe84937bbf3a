//! The reconciled notification collection.

use crate::{insert_sorted, merge_notifications, NotificationBackend, RealtimeLink};
use board_http::ApiResult;
use board_protocol_types::{Notification, NotificationId, NotificationPage};
use board_realtime::{ConnectionState, Subscription};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// What consumers render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationView {
    /// Newest first, unique by id.
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub loading: bool,
    pub socket_connected: bool,
}

/// State captured before an optimistic update and restored verbatim if the
/// server rejects it.
#[derive(Default)]
struct Snapshot {
    notifications: Vec<Notification>,
    unread_count: u64,
}

impl Snapshot {
    fn of(view: &NotificationView) -> Self {
        Self {
            notifications: view.notifications.clone(),
            unread_count: view.unread_count,
        }
    }
}

struct Inner<B, L> {
    backend: B,
    link: L,
    page_size: u32,
    view: watch::Sender<NotificationView>,
    /// Cleared by `stop()`; REST results arriving afterwards are dropped.
    live: AtomicBool,
    /// REST refreshes in flight; `loading` stays set until the last lands.
    pending_loads: AtomicUsize,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Merges REST pages and socket pushes into one collection.
///
/// Clones share the same state.
pub struct NotificationCenter<B, L> {
    inner: Arc<Inner<B, L>>,
}

impl<B, L> Clone for NotificationCenter<B, L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B, L> NotificationCenter<B, L>
where
    B: NotificationBackend + 'static,
    L: RealtimeLink + 'static,
{
    pub fn new(backend: B, link: L) -> Self {
        Self::with_page_size(backend, link, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(backend: B, link: L, page_size: u32) -> Self {
        let (view, _rx) = watch::channel(NotificationView::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                link,
                page_size,
                view,
                live: AtomicBool::new(false),
                pending_loads: AtomicUsize::new(0),
                subscriptions: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn link(&self) -> &L {
        &self.inner.link
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationView> {
        self.inner.view.subscribe()
    }

    pub fn snapshot(&self) -> NotificationView {
        self.inner.view.borrow().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.view.borrow().notifications.clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.inner.view.borrow().unread_count
    }

    pub fn loading(&self) -> bool {
        self.inner.view.borrow().loading
    }

    pub fn is_socket_connected(&self) -> bool {
        self.inner.view.borrow().socket_connected
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Register socket listeners, open the socket, and load the unread
    /// count and first page.
    pub async fn start(&self) -> ApiResult<()> {
        if self.inner.live.swap(true, Ordering::SeqCst) {
            debug!("Notification center already started");
            return Ok(());
        }

        let weak = Arc::downgrade(&self.inner);
        let subscriptions = vec![
            self.inner.link.on_notification(Box::new({
                let weak = weak.clone();
                move |notification: &Notification| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_push(notification.clone());
                    }
                }
            })),
            self.inner.link.on_unread_notifications(Box::new({
                let weak = weak.clone();
                move |notifications: &Vec<Notification>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_unread_set(notifications.clone());
                    }
                }
            })),
            self.inner.link.on_connection_change(Box::new({
                let weak = weak.clone();
                move |state: &ConnectionState| on_connection_change(&weak, *state)
            })),
        ];
        *self.inner.subscriptions.lock() = subscriptions;

        let connected = self.inner.link.status() == ConnectionState::Connected;
        self.inner.update(|view| view.socket_connected = connected);

        info!(page_size = self.inner.page_size, "Starting notification center");
        self.inner.link.connect();
        self.inner.refresh().await
    }

    /// Drop socket listeners, disconnect, and ignore any REST result that
    /// lands afterwards.
    pub fn stop(&self) {
        if !self.inner.live.swap(false, Ordering::SeqCst) {
            return;
        }
        self.inner.subscriptions.lock().clear();
        self.inner.link.disconnect();
        self.inner.update(|view| {
            view.loading = false;
            view.socket_connected = false;
        });
        info!("Notification center stopped");
    }

    /// Re-fetch the unread count and first page. Does nothing unless the
    /// center is started.
    pub async fn refresh(&self) -> ApiResult<()> {
        self.inner.refresh().await
    }

    /// Fetch `page`, merge it, and hand back the raw page so the caller can
    /// check [`NotificationPage::has_next`].
    pub async fn load_more_notifications(&self, page: u32) -> ApiResult<NotificationPage> {
        let result = self
            .inner
            .backend
            .fetch_page(page, self.inner.page_size)
            .await;

        match &result {
            Ok(fetched) if self.inner.is_live() => {
                debug!(page, received = fetched.results.len(), "Merging notification page");
                let incoming = fetched.results.clone();
                self.inner.update(|view| {
                    view.notifications =
                        merge_notifications(std::mem::take(&mut view.notifications), incoming);
                });
            }
            Ok(_) => debug!(page, "Discarding page fetched after stop"),
            Err(e) => warn!(page, error = %e, "Failed to load notifications"),
        }
        result
    }

    /// Mark one notification read, optimistically.
    ///
    /// The receipt goes over the socket when it is connected, otherwise
    /// through REST. A REST failure restores the collection and count to
    /// exactly what they were before the call and returns the error.
    pub async fn mark_as_read(&self, id: &NotificationId) -> ApiResult<()> {
        let snapshot = self.inner.update_with(|view| {
            let snapshot = Snapshot::of(view);
            let was_unread = match view.notifications.iter_mut().find(|n| &n.id == id) {
                Some(notification) => !std::mem::replace(&mut notification.is_read, true),
                // Not loaded locally; the server still counts it as unread.
                None => true,
            };
            if was_unread {
                view.unread_count = view.unread_count.saturating_sub(1);
            }
            snapshot
        });

        if self.inner.link.status() == ConnectionState::Connected
            && self.inner.link.mark_as_read(id)
        {
            debug!(notification_id = %id, "Read receipt sent over socket");
            return Ok(());
        }

        if let Err(e) = self.inner.backend.mark_read(id).await {
            warn!(notification_id = %id, error = %e, "Mark as read failed, rolling back");
            self.inner.restore(snapshot);
            return Err(e);
        }
        Ok(())
    }

    /// Mark everything read, with the same confirmation and rollback as
    /// [`mark_as_read`](Self::mark_as_read).
    pub async fn mark_all_as_read(&self) -> ApiResult<()> {
        let snapshot = self.inner.update_with(|view| {
            let snapshot = Snapshot::of(view);
            for notification in &mut view.notifications {
                notification.is_read = true;
            }
            view.unread_count = 0;
            snapshot
        });

        if self.inner.link.status() == ConnectionState::Connected
            && self.inner.link.mark_all_as_read()
        {
            debug!("Mark-all receipt sent over socket");
            return Ok(());
        }

        if let Err(e) = self.inner.backend.mark_all_read().await {
            warn!(error = %e, "Mark all as read failed, rolling back");
            self.inner.restore(snapshot);
            return Err(e);
        }
        Ok(())
    }
}

fn on_connection_change<B, L>(weak: &Weak<Inner<B, L>>, state: ConnectionState)
where
    B: NotificationBackend + 'static,
    L: RealtimeLink + 'static,
{
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let connected = state == ConnectionState::Connected;
    inner.update(|view| view.socket_connected = connected);

    if !connected {
        return;
    }
    // Events may have been missed while the socket was down.
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                if !inner.is_live() {
                    return;
                }
                if let Err(e) = inner.refresh().await {
                    warn!(error = %e, "Re-sync after connect failed");
                }
            });
        }
        Err(e) => warn!(error = %e, "No runtime for re-sync after connect"),
    }
}

impl<B, L> Inner<B, L>
where
    B: NotificationBackend,
    L: RealtimeLink,
{
    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn update(&self, mutate: impl FnOnce(&mut NotificationView)) {
        self.view.send_if_modified(|view| {
            let before = view.clone();
            mutate(view);
            *view != before
        });
    }

    fn update_with<R: Default>(&self, mutate: impl FnOnce(&mut NotificationView) -> R) -> R {
        let mut result = R::default();
        self.update(|view| result = mutate(view));
        result
    }

    fn restore(&self, snapshot: Snapshot) {
        if !self.is_live() {
            return;
        }
        self.update(|view| {
            view.notifications = snapshot.notifications;
            view.unread_count = snapshot.unread_count;
        });
    }

    fn apply_push(&self, notification: Notification) {
        let id = notification.id.clone();
        let unread = !notification.is_read;
        let mut inserted = false;
        self.update(|view| {
            inserted = insert_sorted(&mut view.notifications, notification);
            if inserted && unread {
                view.unread_count += 1;
            }
        });

        if inserted {
            debug!(notification_id = %id, unread, "Pushed notification added");
        } else {
            debug!(notification_id = %id, "Ignoring duplicate pushed notification");
        }
    }

    fn apply_unread_set(&self, notifications: Vec<Notification>) {
        let count = notifications.len() as u64;
        self.update(|view| {
            view.notifications =
                merge_notifications(std::mem::take(&mut view.notifications), notifications);
            view.unread_count = count;
        });
        debug!(unread_count = count, "Unread set resynced from socket");
    }

    async fn refresh(&self) -> ApiResult<()> {
        if !self.is_live() {
            debug!("Notification center not started, skipping refresh");
            return Ok(());
        }

        self.update(|view| {
            self.pending_loads.fetch_add(1, Ordering::SeqCst);
            view.loading = true;
        });

        let (count, page) = tokio::join!(
            self.backend.fetch_unread_count(),
            self.backend.fetch_page(1, self.page_size)
        );

        let live = self.is_live();
        self.update(|view| {
            let remaining = self.pending_loads.fetch_sub(1, Ordering::SeqCst) - 1;
            view.loading = live && remaining > 0;
            if !live {
                return;
            }
            if let Ok(count) = &count {
                view.unread_count = *count;
            }
            if let Ok(page) = &page {
                view.notifications = merge_notifications(
                    std::mem::take(&mut view.notifications),
                    page.results.iter().cloned(),
                );
            }
        });

        if !live {
            debug!("Discarding notification fetch after stop");
            return count.and(page.map(|_| ()));
        }
        if let Err(e) = &count {
            warn!(error = %e, "Failed to fetch unread count");
        }
        if let Err(e) = &page {
            warn!(error = %e, "Failed to fetch notifications");
        }
        count.and(page.map(|_| ()))
    }
}
