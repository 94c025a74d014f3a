//! Presence transitions persisted to the users table.

use vidshare_realtime::connection::AuthenticatedConnection;

use crate::helpers::{TestApp, TestUser};

fn identity(user: &TestUser) -> AuthenticatedConnection {
    AuthenticatedConnection {
        user_id: user.id,
        username: user.username.clone(),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_online_flag_follows_the_last_connection() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let who = identity(&ann);

    let first = app.engine.connect(Some(&who)).expect("connect");
    let second = app.engine.connect(Some(&who)).expect("connect");
    app.engine.presence.settle().await;
    assert!(app.stored_online(ann.id).await);

    app.engine.disconnect(&first.handle.id);
    app.engine.presence.settle().await;
    assert!(app.stored_online(ann.id).await);

    app.engine.disconnect(&second.handle.id);
    app.engine.presence.settle().await;
    assert!(!app.stored_online(ann.id).await);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at VIDSHARE__DATABASE__URL"]
async fn test_shutdown_marks_connected_users_offline() {
    let app = TestApp::new().await;
    let ann = app.user("ann").await;
    let bob = app.user("bob").await;

    app.engine.connect(Some(&identity(&ann))).expect("connect");
    app.engine.connect(Some(&identity(&bob))).expect("connect");
    app.engine.presence.settle().await;
    assert!(app.stored_online(bob.id).await);

    app.engine.shutdown().await;
    assert!(!app.stored_online(ann.id).await);
    assert!(!app.stored_online(bob.id).await);
}
