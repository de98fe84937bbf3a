//! Notification records and the paginated list envelope.

use crate::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notifications are keyed by the same id type as every other record.
pub type NotificationId = RecordId;

/// Kind of event a notification describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ApplicationStatus,
    NewApplication,
    JobPosted,
    JobUpdate,
    Message,
    System,
    #[default]
    #[serde(other)]
    Other,
}

/// A single notification as delivered by REST or the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Related-object references (job id, application id, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of `GET /notifications/`.
///
/// The API normally answers with a paginated envelope; an unpaginated bare
/// array is treated as a single, final page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageRepr")]
pub struct NotificationPage {
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Notification>,
}

impl NotificationPage {
    /// Whether the server advertised another page.
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr {
    Paged {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<Notification>,
    },
    Bare(Vec<Notification>),
}

impl From<PageRepr> for NotificationPage {
    fn from(repr: PageRepr) -> Self {
        match repr {
            PageRepr::Paged {
                count,
                next,
                previous,
                results,
            } => Self {
                count,
                next,
                previous,
                results,
            },
            PageRepr::Bare(results) => Self {
                count: Some(results.len() as u64),
                next: None,
                previous: None,
                results,
            },
        }
    }
}

/// Body of `GET /notifications/count/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(id: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "Application received",
            "message": "Someone applied to Backend Engineer",
            "notification_type": "new_application",
            "is_read": false,
            "created_at": "2024-01-01T10:00:00Z",
            "job_id": 99
        })
    }

    #[test]
    fn test_notification_deserialization() {
        let notification: Notification = serde_json::from_value(sample_json("n1".into())).unwrap();

        assert_eq!(notification.id, NotificationId::from("n1"));
        assert_eq!(
            notification.notification_type,
            NotificationType::NewApplication
        );
        assert!(!notification.is_read);
        assert_eq!(
            notification.extra.get("job_id").and_then(|v| v.as_i64()),
            Some(99)
        );
    }

    #[test]
    fn test_unknown_notification_type_is_other() {
        let mut value = sample_json(3.into());
        value["notification_type"] = "interview_scheduled".into();
        let notification: Notification = serde_json::from_value(value).unwrap();
        assert_eq!(notification.notification_type, NotificationType::Other);
    }

    #[test]
    fn test_paginated_page() {
        let page: NotificationPage = serde_json::from_value(serde_json::json!({
            "count": 41,
            "next": "https://api.example.com/notifications/?page=2",
            "previous": null,
            "results": [sample_json(1.into()), sample_json(2.into())]
        }))
        .unwrap();

        assert_eq!(page.count, Some(41));
        assert!(page.has_next());
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page: NotificationPage = serde_json::from_value(serde_json::json!({
            "count": 1,
            "next": null,
            "previous": "https://api.example.com/notifications/?page=1",
            "results": [sample_json(1.into())]
        }))
        .unwrap();
        assert!(!page.has_next());
    }

    #[test]
    fn test_bare_array_is_a_final_page() {
        let page: NotificationPage =
            serde_json::from_value(serde_json::json!([sample_json(1.into())])).unwrap();
        assert_eq!(page.count, Some(1));
        assert!(!page.has_next());
    }

    #[test]
    fn test_unread_count() {
        let count: UnreadCount = serde_json::from_str(r#"{"unread_count": 4}"#).unwrap();
        assert_eq!(count.unread_count, 4);
    }
}
