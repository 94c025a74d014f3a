//! Shared test helpers for integration tests.
//!
//! These tests talk to a real PostgreSQL instance named by
//! `VIDSHARE__DATABASE__URL`. Every test creates its own users with unique
//! names, so tests can share one database and run in parallel.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use vidshare_api::{AppState, build_app};
use vidshare_auth::jwt::{JwtDecoder, JwtEncoder};
use vidshare_core::config::AppConfig;
use vidshare_core::types::id::UserId;
use vidshare_database::DatabasePool;
use vidshare_database::migration::run_migrations;
use vidshare_database::repositories::{
    NotificationRepository, OutboxRepository, PlaylistRepository, UserRepository, VideoRepository,
};
use vidshare_entity::content::{Playlist, Video};
use vidshare_realtime::RealtimeEngine;
use vidshare_worker::OutboxRelay;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db: DatabasePool,
    /// Realtime engine behind the router
    pub engine: RealtimeEngine,
    /// Relay draining the shared outbox into this app's dispatcher
    pub relay: OutboxRelay,
    users: UserRepository,
    videos: VideoRepository,
    playlists: PlaylistRepository,
    encoder: JwtEncoder,
}

/// A registered user with a signed access token.
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub token: String,
}

/// A response with its JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::load("test").expect("Failed to load test config");
        config.realtime.ping_interval_seconds = 0;

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let users = UserRepository::new(db.pool().clone());
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let encoder = JwtEncoder::new(&config.auth);
        let engine = RealtimeEngine::new(
            config.realtime.clone(),
            Arc::new(NotificationRepository::new(db.pool().clone())),
            Arc::new(users.clone()),
            Arc::clone(&decoder),
        );
        engine.start().expect("Failed to start realtime engine");

        let relay = OutboxRelay::new(
            Arc::new(OutboxRepository::new(db.pool().clone())),
            Arc::clone(&engine.notifications),
            config.worker.clone(),
        );

        let videos = VideoRepository::new(db.pool().clone());
        let playlists = PlaylistRepository::new(db.pool().clone());
        let state = AppState::new(config, db.clone(), decoder, engine.clone());
        let router = build_app(state);

        Self {
            router,
            db,
            engine,
            relay,
            users,
            videos,
            playlists,
            encoder,
        }
    }

    /// Insert a user whose name starts with `prefix`.
    pub async fn user(&self, prefix: &str) -> TestUser {
        let suffix = Uuid::new_v4().simple().to_string();
        let username = format!("{prefix}_{}", &suffix[..12]);
        let user = self
            .users
            .create(&username, &format!("{username}@example.test"), None)
            .await
            .expect("Failed to create user");
        let (token, _) = self
            .encoder
            .generate_access_token(user.id, &username)
            .expect("Failed to sign token");

        TestUser {
            id: user.id,
            username,
            token,
        }
    }

    /// Insert a video owned by `creator`.
    pub async fn video(&self, creator: &TestUser) -> Video {
        self.videos
            .create(creator.id, "integration clip")
            .await
            .expect("Failed to create video")
    }

    /// Insert an empty playlist owned by `owner`.
    pub async fn playlist(&self, owner: &TestUser) -> Playlist {
        self.playlists
            .create(owner.id, "watch later")
            .await
            .expect("Failed to create playlist")
    }

    /// Whether the stored presence flag says the user is online.
    pub async fn stored_online(&self, user_id: UserId) -> bool {
        self.users
            .find_by_id(user_id)
            .await
            .expect("Failed to load user")
            .expect("user exists")
            .is_online
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", user.token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    /// List a user's notifications as JSON items.
    pub async fn notifications_of(&self, user: &TestUser) -> Vec<Value> {
        let response = self
            .request("GET", "/api/notifications?limit=100", Some(user), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.data()["items"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// Drain the outbox until `user` has `expected` notifications.
    ///
    /// Other tests drain the same outbox, so an entry may be delivered by a
    /// sibling relay; polling the listing covers both cases.
    pub async fn wait_for_notifications(&self, user: &TestUser, expected: usize) -> Vec<Value> {
        for _ in 0..50 {
            self.relay.drain_once().await.expect("drain outbox");
            let items = self.notifications_of(user).await;
            if items.len() >= expected {
                return items;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("{} never reached {expected} notifications", user.username);
    }

    /// Drain the outbox a few times and return whatever the user has.
    pub async fn settled_notifications(&self, user: &TestUser) -> Vec<Value> {
        for _ in 0..3 {
            self.relay.drain_once().await.expect("drain outbox");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.notifications_of(user).await
    }
}
