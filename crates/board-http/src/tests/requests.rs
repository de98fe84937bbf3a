//! Request shaping and response decoding.

use super::harness::{profile_json, MockResponse, MockServer};
use crate::{ErrorKind, ErrorStatus, CSRF_HEADER};
use board_protocol_types::NotificationId;

fn notification(id: i64, created_at: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": "Status update",
        "message": "Your application moved to interview",
        "notification_type": "application_status",
        "is_read": false,
        "created_at": created_at
    })
}

#[tokio::test]
async fn csrf_token_from_cookie_is_sent_on_later_requests() {
    let server = MockServer::start(|req| match req.path.as_str() {
        "/api/auth/login/" => MockResponse::json(200, serde_json::json!({ "user": profile_json() }))
            .with_header("Set-Cookie", "csrftoken=tok-1; Path=/")
            .with_header("Set-Cookie", "sessionid=sess-1; Path=/; HttpOnly"),
        _ => MockResponse::json(200, serde_json::json!({ "unread_count": 0 })),
    })
    .await;
    let client = server.client();

    let user = client.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(user.first_name, "Ada");
    assert_eq!(client.unread_count().await.unwrap(), 0);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    let login = &requests[0];
    assert_eq!(login.header(CSRF_HEADER), None);
    assert_eq!(login.json()["email"], "ada@example.com");

    let count = &requests[1];
    assert_eq!(count.header(CSRF_HEADER), Some("tok-1"));
    assert!(count.header("cookie").unwrap().contains("sessionid=sess-1"));
    assert_eq!(count.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn list_notifications_sends_page_and_page_size() {
    let server = MockServer::start(|_| {
        MockResponse::json(
            200,
            serde_json::json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    notification(2, "2024-01-02T00:00:00Z"),
                    notification(1, "2024-01-01T00:00:00Z")
                ]
            }),
        )
    })
    .await;

    let page = server.client().list_notifications(2, 20).await.unwrap();

    assert_eq!(page.results.len(), 2);
    assert!(!page.has_next());
    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/notifications/");
    let query = request.query.as_deref().unwrap();
    assert!(query.contains("page=2"));
    assert!(query.contains("page_size=20"));
}

#[tokio::test]
async fn empty_success_bodies_decode_as_unit() {
    let server = MockServer::start(|_| MockResponse::empty(200)).await;
    let client = server.client();

    client
        .mark_notification_read(&NotificationId::from("n1"))
        .await
        .unwrap();
    client.mark_all_notifications_read().await.unwrap();
    client.logout().await.unwrap();

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/api/notifications/mark-read/n1/",
            "/api/notifications/mark-all-read/",
            "/api/auth/logout/",
        ]
    );
}

#[tokio::test]
async fn validation_errors_are_normalized() {
    let server = MockServer::start(|_| {
        MockResponse::json(
            400,
            serde_json::json!({
                "password": ["This password is too short."],
                "email": ["Enter a valid email address."]
            }),
        )
    })
    .await;

    let error = server.client().login("not-an-email", "x").await.unwrap_err();

    assert_eq!(error.status, ErrorStatus::Http(400));
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.message, "Enter a valid email address.");
    assert_eq!(error.field_errors.len(), 2);
}

#[tokio::test]
async fn unstructured_server_errors_use_generic_message() {
    let server = MockServer::start(|_| MockResponse::text(500, "<h1>Server Error</h1>")).await;

    let error = server.client().unread_count().await.unwrap_err();

    assert_eq!(error.message, "Request failed with status code 500");
    assert_eq!(error.kind(), ErrorKind::Server);
    assert!(!error.refresh_attempted());
}

#[tokio::test]
async fn undecodable_success_body_is_an_error() {
    let server = MockServer::start(|_| MockResponse::text(200, "not json")).await;

    let error = server.client().unread_count().await.unwrap_err();

    assert_eq!(error.status, ErrorStatus::Http(200));
    assert!(error.message.starts_with("Invalid response body"));
}
