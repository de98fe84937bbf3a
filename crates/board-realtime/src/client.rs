//! Notification socket client.
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──open──► Connected
//!      ▲                          │                   │
//!      └────── close / error / failed to open ────────┘
//!      │
//!      └─ attempts left ──► Reconnecting ──timer──► Connecting
//! ```
//!
//! Transport failures never reach callers; they only show up as a
//! `Disconnected` transition followed by the reconnect policy.

use crate::{
    Listeners, OutboundFrame, RealtimeError, RealtimeResult, ReconnectPolicy, ServerFrame,
    Subscription,
};
use board_http::ApiClient;
use board_protocol_types::{Notification, NotificationId};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Supplies credentials for the WebSocket handshake.
pub trait HandshakeAuth: Send + Sync {
    /// `Cookie` header value to send to `url`, if any.
    fn cookie_header(&self, url: &Url) -> Option<String>;
}

impl HandshakeAuth for ApiClient {
    fn cookie_header(&self, url: &Url) -> Option<String> {
        self.cookie_header_for(url)
    }
}

/// Socket client configuration.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Socket URL, e.g. `wss://jobs.example.com/ws/notifications/`.
    pub url: Url,
    pub max_reconnect_attempts: u32,
    pub reconnect_base_interval: Duration,
}

impl RealtimeConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            max_reconnect_attempts: 5,
            reconnect_base_interval: Duration::from_millis(3000),
        }
    }
}

struct Connection {
    state: ConnectionState,
    policy: ReconnectPolicy,
    sender: Option<mpsc::UnboundedSender<Message>>,
    task: Option<JoinHandle<()>>,
    reconnect_timer: Option<JoinHandle<()>>,
    /// Bumped by every connect/disconnect; work tagged with an older epoch
    /// is stale and must not touch state.
    epoch: u64,
}

struct Inner {
    config: RealtimeConfig,
    auth: Option<Arc<dyn HandshakeAuth>>,
    connection: Mutex<Connection>,
    /// Held from a state change until its listeners have run, so listeners
    /// see changes in the order they were made. Reentrant so a listener may
    /// call `connect`/`disconnect`.
    emission: ReentrantMutex<()>,
    notification_listeners: Listeners<Notification>,
    unread_listeners: Listeners<Vec<Notification>>,
    state_listeners: Listeners<ConnectionState>,
}

/// Shared handle to the single notification socket. Clones control the same
/// connection.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl RealtimeClient {
    pub fn new(config: RealtimeConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a client whose handshake carries credentials from `auth`.
    pub fn with_auth(config: RealtimeConfig, auth: Arc<dyn HandshakeAuth>) -> Self {
        Self::build(config, Some(auth))
    }

    fn build(config: RealtimeConfig, auth: Option<Arc<dyn HandshakeAuth>>) -> Self {
        let policy = ReconnectPolicy::new(
            config.max_reconnect_attempts,
            config.reconnect_base_interval,
        );

        Self {
            inner: Arc::new(Inner {
                config,
                auth,
                connection: Mutex::new(Connection {
                    state: ConnectionState::Disconnected,
                    policy,
                    sender: None,
                    task: None,
                    reconnect_timer: None,
                    epoch: 0,
                }),
                emission: ReentrantMutex::new(()),
                notification_listeners: Listeners::new(),
                unread_listeners: Listeners::new(),
                state_listeners: Listeners::new(),
            }),
        }
    }

    pub fn status(&self) -> ConnectionState {
        self.inner.connection.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionState::Connected
    }

    /// Reconnect attempts consumed since the last successful connection.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.connection.lock().policy.attempts()
    }

    /// Open the socket. A no-op while connecting or connected; cancels any
    /// pending reconnect timer otherwise.
    pub fn connect(&self) {
        self.inner.connect();
    }

    /// Close the socket, cancel any pending reconnect, and force
    /// `Disconnected`.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Queue `frame` for sending. Returns false, sending nothing, unless
    /// the socket is connected.
    pub fn send_message(&self, frame: &OutboundFrame) -> bool {
        let connection = self.inner.connection.lock();
        if connection.state != ConnectionState::Connected {
            return false;
        }
        let Some(sender) = connection.sender.as_ref() else {
            return false;
        };

        match frame.to_json() {
            Ok(json) => sender.send(Message::Text(json.into())).is_ok(),
            Err(e) => {
                warn!(error = %e, "Failed to encode socket frame");
                false
            }
        }
    }

    pub fn mark_as_read(&self, notification_id: &NotificationId) -> bool {
        self.send_message(&OutboundFrame::MarkAsRead {
            notification_id: notification_id.clone(),
        })
    }

    pub fn mark_all_as_read(&self) -> bool {
        self.send_message(&OutboundFrame::MarkAllAsRead)
    }

    pub fn on_notification<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.inner.notification_listeners.add(callback)
    }

    pub fn on_unread_notifications<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<Notification>) + Send + Sync + 'static,
    {
        self.inner.unread_listeners.add(callback)
    }

    /// Called on every state change; never for a transition into the
    /// state already held.
    pub fn on_connection_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectionState) + Send + Sync + 'static,
    {
        self.inner.state_listeners.add(callback)
    }
}

/// Set `state`, returning it if it actually changed.
fn transition(connection: &mut Connection, state: ConnectionState) -> Option<ConnectionState> {
    if connection.state == state {
        return None;
    }
    debug!(from = ?connection.state, to = ?state, "Socket state change");
    connection.state = state;
    Some(state)
}

impl Inner {
    fn emit_states(&self, changes: impl IntoIterator<Item = ConnectionState>) {
        for state in changes {
            self.state_listeners.emit(&state);
        }
    }

    fn connect(self: &Arc<Self>) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Cannot connect notification socket outside a runtime");
                return;
            }
        };

        let _emitting = self.emission.lock();
        let change = {
            let mut connection = self.connection.lock();
            if matches!(
                connection.state,
                ConnectionState::Connecting | ConnectionState::Connected
            ) {
                debug!(state = ?connection.state, "Already connecting or connected");
                return;
            }

            if let Some(timer) = connection.reconnect_timer.take() {
                timer.abort();
            }
            connection.epoch += 1;
            let epoch = connection.epoch;

            info!(url = %self.config.url, "Connecting notification socket");
            let change = transition(&mut connection, ConnectionState::Connecting);
            connection.task = Some(runtime.spawn(run_connection(self.clone(), epoch)));
            change
        };

        self.emit_states(change);
    }

    fn disconnect(&self) {
        let _emitting = self.emission.lock();
        let change = {
            let mut connection = self.connection.lock();
            connection.epoch += 1;

            if let Some(timer) = connection.reconnect_timer.take() {
                timer.abort();
            }
            // Dropping the sender lets an open socket close gracefully.
            connection.sender = None;
            if let Some(task) = connection.task.take() {
                if connection.state != ConnectionState::Connected {
                    task.abort();
                }
            }

            transition(&mut connection, ConnectionState::Disconnected)
        };

        if change.is_some() {
            info!("Notification socket disconnected");
        }
        self.emit_states(change);
    }

    fn build_request(&self) -> RealtimeResult<Request> {
        let mut request = self.config.url.as_str().into_client_request()?;

        if let Some(cookie) = self
            .auth
            .as_ref()
            .and_then(|auth| auth.cookie_header(&self.config.url))
        {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| RealtimeError::Handshake(e.to_string()))?;
            request.headers_mut().insert(COOKIE, value);
        }

        Ok(request)
    }

    /// Returns false if the connection attempt has gone stale.
    fn transport_opened(&self, epoch: u64, sender: mpsc::UnboundedSender<Message>) -> bool {
        let _emitting = self.emission.lock();
        let change = {
            let mut connection = self.connection.lock();
            if connection.epoch != epoch || connection.state != ConnectionState::Connecting {
                return false;
            }
            connection.sender = Some(sender);
            connection.policy.reset();
            transition(&mut connection, ConnectionState::Connected)
        };

        info!(url = %self.config.url, "Notification socket connected");
        self.emit_states(change);
        true
    }

    fn transport_closed(self: &Arc<Self>, epoch: u64) {
        let _emitting = self.emission.lock();
        let mut changes = Vec::new();
        {
            let mut connection = self.connection.lock();
            if connection.epoch != epoch {
                return;
            }
            connection.sender = None;
            connection.task = None;
            changes.extend(transition(&mut connection, ConnectionState::Disconnected));

            match connection.policy.next_delay() {
                Some(delay) => {
                    info!(
                        attempt = connection.policy.attempts(),
                        max_attempts = connection.policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling reconnect"
                    );
                    changes.extend(transition(&mut connection, ConnectionState::Reconnecting));
                    connection.reconnect_timer =
                        Some(tokio::spawn(reconnect_after(Arc::downgrade(self), epoch, delay)));
                }
                None => {
                    warn!(
                        attempts = connection.policy.attempts(),
                        "Reconnect attempts exhausted, staying disconnected"
                    );
                }
            }
        }

        self.emit_states(changes);
    }

    fn dispatch(&self, text: &str) {
        match ServerFrame::parse(text) {
            Ok(ServerFrame::NotificationMessage { notification }) => {
                debug!(notification_id = %notification.id, "Notification pushed");
                self.notification_listeners.emit(&notification);
            }
            Ok(ServerFrame::UnreadNotifications { notifications }) => {
                debug!(count = notifications.len(), "Unread notifications pushed");
                self.unread_listeners.emit(&notifications);
            }
            Ok(ServerFrame::Unknown) => {
                debug!("Ignoring unknown socket frame");
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed socket frame");
            }
        }
    }
}

async fn reconnect_after(inner: Weak<Inner>, epoch: u64, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    {
        let mut connection = inner.connection.lock();
        if connection.epoch != epoch || connection.state != ConnectionState::Reconnecting {
            return;
        }
        // Release our own handle so connect() does not abort this task.
        connection.reconnect_timer = None;
    }
    inner.connect();
}

async fn run_connection(inner: Arc<Inner>, epoch: u64) {
    let request = match inner.build_request() {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Invalid notification socket request");
            inner.transport_closed(epoch);
            return;
        }
    };

    let stream = match connect_async(request).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            warn!(error = %e, "Notification socket failed to open");
            inner.transport_closed(epoch);
            return;
        }
    };

    let (mut write, mut read) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    if !inner.transport_opened(epoch, tx) {
        debug!("Discarding stale socket connection");
        let _ = write.close().await;
        return;
    }

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(message) => {
                    if let Err(e) = write.send(message).await {
                        warn!(error = %e, "Socket write failed");
                        break;
                    }
                }
                None => {
                    // Every sender dropped: disconnect() was called.
                    let _ = write.close().await;
                    break;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => inner.dispatch(&text),
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "Notification socket closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "Notification socket error");
                    break;
                }
                None => break,
            },
        }
    }

    inner.transport_closed(epoch);
}
