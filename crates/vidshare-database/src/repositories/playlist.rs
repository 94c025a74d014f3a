//! Playlist repository. Membership and `video_count` move together.

use sqlx::{PgPool, Postgres, Transaction};

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{PlaylistId, UserId, VideoId};
use vidshare_entity::content::Playlist;

/// Repository for playlists and their video membership.
#[derive(Debug, Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new playlist repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a playlist by ID.
    pub async fn find_by_id(&self, id: PlaylistId) -> AppResult<Option<Playlist>> {
        sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find playlist", e))
    }

    /// Create an empty playlist.
    pub async fn create(&self, owner_id: UserId, name: &str) -> AppResult<Playlist> {
        sqlx::query_as::<_, Playlist>(
            "INSERT INTO playlists (id, owner_id, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(PlaylistId::new())
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create playlist", e))
    }

    /// Add a video. Returns `None` when it was already a member.
    pub async fn add_video(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Option<Playlist>> {
        let inserted = sqlx::query(
            "INSERT INTO playlist_videos (playlist_id, video_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add playlist video", e))?
        .rows_affected()
            == 1;

        if !inserted {
            return Ok(None);
        }
        self.adjust_count(tx, playlist_id, 1).await.map(Some)
    }

    /// Remove a video. Returns `None` when it was not a member.
    pub async fn remove_video(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Option<Playlist>> {
        let removed =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove playlist video", e)
                })?
                .rows_affected()
                == 1;

        if !removed {
            return Ok(None);
        }
        self.adjust_count(tx, playlist_id, -1).await.map(Some)
    }

    async fn adjust_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        playlist_id: PlaylistId,
        delta: i64,
    ) -> AppResult<Playlist> {
        sqlx::query_as::<_, Playlist>(
            "UPDATE playlists SET video_count = GREATEST(video_count + $2, 0) \
             WHERE id = $1 RETURNING *",
        )
        .bind(playlist_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update video count", e))
    }
}
