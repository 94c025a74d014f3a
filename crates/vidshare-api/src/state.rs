//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use vidshare_auth::jwt::JwtDecoder;
use vidshare_core::config::AppConfig;
use vidshare_database::DatabasePool;
use vidshare_database::repositories::{
    CommentRepository, OutboxRepository, PlaylistRepository, UserRepository, VideoRepository,
};
use vidshare_realtime::RealtimeEngine;
use vidshare_service::content::{CommentService, VideoService};
use vidshare_service::playlist::PlaylistService;
use vidshare_service::social::SocialService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// When the process started serving
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Realtime ─────────────────────────────────────────────
    /// WebSocket channel, presence and notification dispatch
    pub realtime: RealtimeEngine,

    // ── Repositories ─────────────────────────────────────────
    /// Outbox repository
    pub outbox_repo: OutboxRepository,

    // ── Services ─────────────────────────────────────────────
    /// Comments, replies and likes
    pub comment_service: Arc<CommentService>,
    /// Reactions and views
    pub video_service: Arc<VideoService>,
    /// Follow graph
    pub social_service: Arc<SocialService>,
    /// Playlist membership
    pub playlist_service: Arc<PlaylistService>,
}

impl AppState {
    /// Wire repositories and services over the pool.
    pub fn new(
        config: AppConfig,
        db: DatabasePool,
        jwt_decoder: Arc<JwtDecoder>,
        realtime: RealtimeEngine,
    ) -> Self {
        let pool = db.pool().clone();
        let user_repo = UserRepository::new(pool.clone());
        let video_repo = VideoRepository::new(pool.clone());
        let comment_repo = CommentRepository::new(pool.clone());
        let playlist_repo = PlaylistRepository::new(pool.clone());
        let outbox_repo = OutboxRepository::new(pool);

        let comment_service = Arc::new(CommentService::new(
            db.clone(),
            video_repo.clone(),
            comment_repo,
            outbox_repo.clone(),
        ));
        let video_service = Arc::new(VideoService::new(
            db.clone(),
            video_repo.clone(),
            outbox_repo.clone(),
        ));
        let social_service = Arc::new(SocialService::new(
            db.clone(),
            user_repo,
            outbox_repo.clone(),
        ));
        let playlist_service = Arc::new(PlaylistService::new(
            db.clone(),
            playlist_repo,
            video_repo,
        ));

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            db,
            jwt_decoder,
            realtime,
            outbox_repo,
            comment_service,
            video_service,
            social_service,
            playlist_service,
        }
    }
}
