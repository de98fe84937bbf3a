//! Notification socket frames.

use crate::RealtimeResult;
use board_protocol_types::{Notification, NotificationId};
use serde::{Deserialize, Serialize};

/// A frame pushed by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A single new notification.
    NotificationMessage { notification: Notification },
    /// The full set of unread notifications.
    UnreadNotifications {
        #[serde(default)]
        notifications: Vec<Notification>,
    },
    /// Any frame type this client does not handle.
    #[serde(other)]
    Unknown,
}

impl ServerFrame {
    pub fn parse(text: &str) -> RealtimeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A frame sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    MarkAsRead { notification_id: NotificationId },
    MarkAllAsRead,
}

impl OutboundFrame {
    pub fn to_json(&self) -> RealtimeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification_message() {
        let frame = ServerFrame::parse(
            r#"{
                "type": "notification_message",
                "notification": {
                    "id": "n1",
                    "title": "New applicant",
                    "message": "Jordan applied to Data Analyst",
                    "notification_type": "new_application",
                    "is_read": false,
                    "created_at": "2024-01-01T10:00:00Z"
                }
            }"#,
        )
        .unwrap();

        match frame {
            ServerFrame::NotificationMessage { notification } => {
                assert_eq!(notification.id, NotificationId::from("n1"));
                assert!(!notification.is_read);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unread_notifications() {
        let frame = ServerFrame::parse(
            r#"{"type": "unread_notifications", "notifications": [
                {"id": 1, "created_at": "2024-01-01T10:00:00Z"},
                {"id": 2, "created_at": "2024-01-02T10:00:00Z"}
            ]}"#,
        )
        .unwrap();

        match frame {
            ServerFrame::UnreadNotifications { notifications } => assert_eq!(notifications.len(), 2),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let frame = ServerFrame::parse(r#"{"type": "typing_indicator", "user": 3}"#).unwrap();
        assert_eq!(frame, ServerFrame::Unknown);
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(ServerFrame::parse("not json").is_err());
        assert!(ServerFrame::parse(r#"{"type": "notification_message"}"#).is_err());
    }

    #[test]
    fn test_outbound_serialization() {
        let read = OutboundFrame::MarkAsRead {
            notification_id: NotificationId::from(17),
        };
        assert_eq!(
            read.to_json().unwrap(),
            r#"{"type":"mark_as_read","notification_id":17}"#
        );
        assert_eq!(
            OutboundFrame::MarkAllAsRead.to_json().unwrap(),
            r#"{"type":"mark_all_as_read"}"#
        );
    }
}
