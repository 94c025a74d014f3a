//! Notification dispatch, listing and read state against PostgreSQL.

use http::StatusCode;
use serde_json::json;

use vidshare_core::types::id::NotificationId;
use vidshare_database::repositories::NotificationRepository;
use vidshare_entity::notification::{NewNotification, NotificationKind};

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_dispatch_lists_with_sender_profile() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(&ann),
            Some(json!({ "recipient": bob.id, "type": "follow", "message": "hello" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.data()["sender"], json!(ann.id));
    assert_eq!(created.data()["isRead"], json!(false));

    let items = app.notifications_of(&bob).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["senderUsername"], json!(ann.username));
    assert_eq!(items[0]["type"], json!("follow"));
    assert!(app.notifications_of(&ann).await.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_dispatch_to_unknown_recipient_is_rejected() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(&ann),
            Some(json!({ "recipient": uuid::Uuid::new_v4(), "type": "follow" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_mark_read_is_scoped_and_idempotent() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(&ann),
            Some(json!({ "recipient": bob.id, "type": "follow" })),
        )
        .await;
    let id = created.data()["id"].as_str().expect("id").to_string();
    let uri = format!("/api/notifications/{id}/read");

    let foreign = app.request("PATCH", &uri, Some(&ann), None).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let own = app.request("PATCH", &uri, Some(&bob), None).await;
        assert_eq!(own.status, StatusCode::OK, "{}", own.body);
        assert_eq!(own.data()["isRead"], json!(true));
    }

    let unread = app
        .request("GET", "/api/notifications/unread-count", Some(&bob), None)
        .await;
    assert_eq!(unread.data()["count"], json!(0));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_cursor_pages_cover_every_notification_once() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    for i in 0..5 {
        let response = app
            .request(
                "POST",
                "/api/notifications",
                Some(&ann),
                Some(json!({ "recipient": bob.id, "type": "follow", "message": format!("n{i}") })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let mut seen = Vec::new();
    let mut uri = "/api/notifications?limit=2".to_string();
    loop {
        let page = app.request("GET", &uri, Some(&bob), None).await;
        assert_eq!(page.status, StatusCode::OK, "{}", page.body);
        let items = page.data()["items"].as_array().cloned().unwrap_or_default();
        assert!(items.len() <= 2);
        seen.extend(items.iter().map(|n| n["id"].as_str().unwrap_or_default().to_string()));
        match page.data()["next_cursor"].as_str() {
            Some(cursor) => uri = format!("/api/notifications?limit=2&cursor={cursor}"),
            None => break,
        }
    }

    assert_eq!(seen.len(), 5);
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_reinserting_an_id_keeps_the_first_row() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let repo = NotificationRepository::new(app.db.pool().clone());

    let new = NewNotification {
        id: NotificationId::new(),
        recipient_id: bob.id,
        sender_id: ann.id,
        kind: NotificationKind::Follow,
        video_id: None,
        comment_id: None,
        message: Some("first".into()),
    };
    let first = repo.insert(&new).await.expect("insert");
    let again = repo
        .insert(&NewNotification {
            message: Some("second".into()),
            ..new.clone()
        })
        .await
        .expect("reinsert");

    assert_eq!(again, first);
    assert_eq!(repo.count_unread(bob.id).await.expect("count"), 1);
}
