//! Notification commands.

use super::Context;
use crate::output::{self, notification_line, row, OutputFormat};
use anyhow::{bail, Result};
use board_auth::{AuthBootstrapper, BootstrapOutcome, SessionStore};
use board_notifications::{NotificationCenter, NotificationView};
use board_protocol_types::{Notification, NotificationId, NotificationPage};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Serialize)]
struct PageReport {
    page: u32,
    total: Option<u64>,
    has_next: bool,
    notifications: Vec<Notification>,
}

impl PageReport {
    fn new(page: u32, fetched: NotificationPage) -> Self {
        Self {
            page,
            total: fetched.count,
            has_next: fetched.has_next(),
            notifications: fetched.results,
        }
    }
}

impl fmt::Display for PageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.notifications.is_empty() {
            return write!(f, "No notifications on page {}", self.page);
        }
        for notification in &self.notifications {
            writeln!(f, "{}", notification_line(notification))?;
        }
        let total = self
            .total
            .map(|total| format!(" of {}", total))
            .unwrap_or_default();
        write!(f, "\nPage {}{}", self.page, total)?;
        if self.has_next {
            write!(f, " (more: --page {})", self.page + 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CountReport {
    unread_count: u64,
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", row("Unread", &self.unread_count.to_string()))
    }
}

/// List one page of notifications, newest first.
pub async fn list(ctx: &Context, page: u32) -> Result<()> {
    let page = page.max(1);
    let fetched = ctx
        .client
        .list_notifications(page, ctx.config.notification_page_size)
        .await?;
    ctx.save_session()?;
    output::print(&PageReport::new(page, fetched), ctx.format);
    Ok(())
}

pub async fn count(ctx: &Context) -> Result<()> {
    let unread_count = ctx.client.unread_count().await?;
    ctx.save_session()?;
    output::print(&CountReport { unread_count }, ctx.format);
    Ok(())
}

pub async fn mark_read(ctx: &Context, id: &str) -> Result<()> {
    let id: NotificationId = id.parse()?;
    ctx.client.mark_notification_read(&id).await?;
    ctx.save_session()?;
    output::print_success(&format!("Marked notification {} as read", id), ctx.format);
    Ok(())
}

pub async fn mark_all_read(ctx: &Context) -> Result<()> {
    ctx.client.mark_all_notifications_read().await?;
    ctx.save_session()?;
    output::print_success("Marked all notifications as read", ctx.format);
    Ok(())
}

/// Prints what changed between successive views.
struct WatchPrinter {
    format: OutputFormat,
    seen: HashSet<NotificationId>,
    last_status: Option<(u64, bool)>,
}

impl WatchPrinter {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            seen: HashSet::new(),
            last_status: None,
        }
    }

    fn report(&mut self, view: &NotificationView) {
        // Oldest first so the newest ends up at the bottom of the terminal.
        for notification in view.notifications.iter().rev() {
            if !self.seen.insert(notification.id.clone()) {
                continue;
            }
            match self.format {
                OutputFormat::Text => println!("{}", notification_line(notification)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "event": "notification", "notification": notification })
                ),
            }
        }

        let status = (view.unread_count, view.socket_connected);
        if self.last_status == Some(status) {
            return;
        }
        self.last_status = Some(status);
        match self.format {
            OutputFormat::Text => println!(
                "-- {} unread, {} loaded, socket {}",
                view.unread_count,
                view.notifications.len(),
                if view.socket_connected { "connected" } else { "offline" }
            ),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "event": "status",
                    "unread_count": view.unread_count,
                    "loaded": view.notifications.len(),
                    "socket_connected": view.socket_connected,
                })
            ),
        }
    }
}

/// Check the session, start the notification center, and print changes
/// until Ctrl-C.
pub async fn watch(ctx: &Context) -> Result<()> {
    let bootstrapper = AuthBootstrapper::new(ctx.client.clone(), SessionStore::new());
    if let BootstrapOutcome::Unauthenticated { message } = bootstrapper.run().await {
        bail!("Not logged in: {}", message);
    }
    ctx.save_session()?;

    let center = NotificationCenter::with_page_size(
        ctx.client.clone(),
        ctx.realtime()?,
        ctx.config.notification_page_size,
    );
    let mut views = center.subscribe();
    if let Err(e) = center.start().await {
        output::print_error(&format!("Initial load failed: {}", e), ctx.format);
    }

    let mut printer = WatchPrinter::new(ctx.format);
    printer.report(&views.borrow_and_update());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                printer.report(&view);
            }
        }
    }

    center.stop();
    ctx.save_session()?;
    Ok(())
}
