//! Route definitions for the VidShare HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`.

use axum::Router;
use axum::routing::{delete, get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(content_routes())
        .merge(social_routes())
        .merge(playlist_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications)
                .post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notification::mark_read),
        )
}

/// Actions on videos and comments that notify their owners
fn content_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/videos/{id}/comments",
            post(handlers::content::comment_on_video),
        )
        .route(
            "/videos/{id}/reactions",
            post(handlers::content::toggle_reaction),
        )
        .route("/videos/{id}/views", post(handlers::content::record_view))
        .route(
            "/comments/{id}/replies",
            post(handlers::content::reply_to_comment),
        )
        .route(
            "/comments/{id}/like",
            post(handlers::content::toggle_comment_like),
        )
}

/// Follow graph
fn social_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{id}/follow",
        post(handlers::social::follow).delete(handlers::social::unfollow),
    )
}

/// Playlist membership
fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/playlists/{id}/videos",
            post(handlers::playlist::add_video),
        )
        .route(
            "/playlists/{id}/videos/{video_id}",
            delete(handlers::playlist::remove_video),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
