//! # vidshare-api
//!
//! HTTP API layer for VidShare built on Axum.
//!
//! Provides the notification endpoints, the triggering actions that create
//! notifications, health checks, the WebSocket upgrade, extractors, DTOs and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use app::build_app;
pub use error::HttpAppError;
pub use state::AppState;
