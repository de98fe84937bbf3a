//! Keyed merge of notification lists.
//!
//! The collection is always ordered newest first by `created_at`, ties by
//! id descending, so merging the same records twice changes nothing.

use board_protocol_types::{Notification, NotificationId};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Newest first; equal timestamps by id, highest first.
fn display_order(a: &Notification, b: &Notification) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Overlay `incoming` onto `current` by id (incoming values win) and sort
/// newest first.
pub fn merge_notifications(
    current: Vec<Notification>,
    incoming: impl IntoIterator<Item = Notification>,
) -> Vec<Notification> {
    let mut merged = current;
    let mut positions: HashMap<NotificationId, usize> = merged
        .iter()
        .enumerate()
        .map(|(index, notification)| (notification.id.clone(), index))
        .collect();

    for notification in incoming {
        match positions.get(&notification.id) {
            Some(&index) => merged[index] = notification,
            None => {
                positions.insert(notification.id.clone(), merged.len());
                merged.push(notification);
            }
        }
    }

    merged.sort_by(display_order);
    merged
}

/// Insert a single notification at its ordered position. Returns false,
/// leaving `list` untouched, if the id is already present.
pub fn insert_sorted(list: &mut Vec<Notification>, notification: Notification) -> bool {
    if list.iter().any(|existing| existing.id == notification.id) {
        return false;
    }
    let index =
        list.partition_point(|existing| display_order(existing, &notification) == Ordering::Less);
    list.insert(index, notification);
    true
}
