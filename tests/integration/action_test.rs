//! Content and social actions that notify through the outbox.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_comment_notifies_the_video_creator() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let video = app.video(&ann).await;

    let created = app
        .request(
            "POST",
            &format!("/api/videos/{}/comments", video.id),
            Some(&bob),
            Some(json!({ "text": "  great clip  " })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.data()["text"], json!("great clip"));
    let comment_id = created.data()["id"].clone();

    let items = app.wait_for_notifications(&ann, 1).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], json!("comment"));
    assert_eq!(items[0]["sender"], json!(bob.id));
    assert_eq!(items[0]["video"], json!(video.id));
    assert_eq!(items[0]["comment"], comment_id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_acting_on_own_content_is_silent() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let video = app.video(&ann).await;

    let comment = app
        .request(
            "POST",
            &format!("/api/videos/{}/comments", video.id),
            Some(&ann),
            Some(json!({ "text": "first" })),
        )
        .await;
    assert_eq!(comment.status, StatusCode::CREATED);
    let comment_id = comment.data()["id"].as_str().expect("id").to_string();

    let reply = app
        .request(
            "POST",
            &format!("/api/comments/{comment_id}/replies"),
            Some(&ann),
            Some(json!({ "text": "and second" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    assert_eq!(reply.data()["parentId"], json!(comment_id));

    let like = app
        .request("POST", &format!("/api/comments/{comment_id}/like"), Some(&ann), None)
        .await;
    assert_eq!(like.status, StatusCode::OK);

    assert!(app.settled_notifications(&ann).await.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_reply_notifies_the_parent_author() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let video = app.video(&ann).await;

    let comment = app
        .request(
            "POST",
            &format!("/api/videos/{}/comments", video.id),
            Some(&ann),
            Some(json!({ "text": "what do you think?" })),
        )
        .await;
    let comment_id = comment.data()["id"].as_str().expect("id").to_string();

    let reply = app
        .request(
            "POST",
            &format!("/api/comments/{comment_id}/replies"),
            Some(&bob),
            Some(json!({ "text": "love it" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let items = app.wait_for_notifications(&ann, 1).await;
    assert_eq!(items[0]["type"], json!("reply"));
    assert_eq!(items[0]["video"], json!(video.id));
    assert_eq!(items[0]["comment"], json!(comment_id));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_follow_twice_conflicts_and_unfollow_is_silent() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let uri = format!("/api/users/{}/follow", ann.id);

    let follow = app.request("POST", &uri, Some(&bob), None).await;
    assert_eq!(follow.status, StatusCode::OK, "{}", follow.body);
    let again = app.request("POST", &uri, Some(&bob), None).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let unfollow = app.request("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(unfollow.status, StatusCode::OK);
    let not_following = app.request("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(not_following.status, StatusCode::BAD_REQUEST);

    let own = format!("/api/users/{}/follow", bob.id);
    let myself = app.request("POST", &own, Some(&bob), None).await;
    assert_eq!(myself.status, StatusCode::BAD_REQUEST);

    app.wait_for_notifications(&ann, 1).await;
    let items = app.settled_notifications(&ann).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], json!("follow"));
    assert_eq!(
        items[0]["message"],
        json!(format!("{} has followed you.", bob.username))
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_reaction_toggles_and_notifies_only_on_add() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let video = app.video(&ann).await;
    let uri = format!("/api/videos/{}/reactions", video.id);

    let added = app
        .request("POST", &uri, Some(&bob), Some(json!({ "type": "love" })))
        .await;
    assert_eq!(added.status, StatusCode::OK, "{}", added.body);
    assert_eq!(added.data()["status"], json!("added"));
    assert_eq!(added.data()["reactionCount"], json!(1));

    let removed = app
        .request("POST", &uri, Some(&bob), Some(json!({ "type": "love" })))
        .await;
    assert_eq!(removed.data()["status"], json!("removed"));
    assert_eq!(removed.data()["reactionCount"], json!(0));

    app.wait_for_notifications(&ann, 1).await;
    let items = app.settled_notifications(&ann).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], json!("reaction"));
    assert_eq!(
        items[0]["message"],
        json!(format!("{} reacted to your video with love.", bob.username))
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_comment_like_toggle_counts() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let video = app.video(&bob).await;

    let comment = app
        .request(
            "POST",
            &format!("/api/videos/{}/comments", video.id),
            Some(&ann),
            Some(json!({ "text": "nice" })),
        )
        .await;
    let comment_id = comment.data()["id"].as_str().expect("id").to_string();
    let uri = format!("/api/comments/{comment_id}/like");

    let liked = app.request("POST", &uri, Some(&bob), None).await;
    assert_eq!(liked.data()["liked"], json!(true));
    assert_eq!(liked.data()["comment"]["likeCount"], json!(1));

    let unliked = app.request("POST", &uri, Some(&bob), None).await;
    assert_eq!(unliked.data()["liked"], json!(false));
    assert_eq!(unliked.data()["comment"]["likeCount"], json!(0));

    let items = app.wait_for_notifications(&ann, 1).await;
    assert_eq!(items[0]["type"], json!("like"));
    assert_eq!(items[0]["comment"], json!(comment_id));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_view_counter_increments() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let video = app.video(&ann).await;
    let uri = format!("/api/videos/{}/views", video.id);

    app.request("POST", &uri, Some(&ann), None).await;
    let second = app.request("POST", &uri, Some(&ann), None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["views"], json!(2));

    let missing = app
        .request(
            "POST",
            &format!("/api/videos/{}/views", uuid::Uuid::new_v4()),
            Some(&ann),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_playlist_membership_rules() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;
    let video = app.video(&bob).await;
    let playlist = app.playlist(&ann).await;
    let uri = format!("/api/playlists/{}/videos", playlist.id);
    let body = json!({ "videoId": video.id });

    let added = app
        .request("POST", &uri, Some(&ann), Some(body.clone()))
        .await;
    assert_eq!(added.status, StatusCode::OK, "{}", added.body);
    assert_eq!(added.data()["videoCount"], json!(1));

    let duplicate = app
        .request("POST", &uri, Some(&ann), Some(body.clone()))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let stranger = app.request("POST", &uri, Some(&bob), Some(body)).await;
    assert_eq!(stranger.status, StatusCode::FORBIDDEN);

    let entry = format!("{uri}/{}", video.id);
    let removed = app.request("DELETE", &entry, Some(&ann), None).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.data()["videoCount"], json!(0));

    let gone = app.request("DELETE", &entry, Some(&ann), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
