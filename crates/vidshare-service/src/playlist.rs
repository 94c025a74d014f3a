//! Playlist membership with owner checks and atomic counts.

use tracing::info;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{PlaylistId, VideoId};
use vidshare_database::DatabasePool;
use vidshare_database::connection::commit;
use vidshare_database::repositories::{PlaylistRepository, VideoRepository};
use vidshare_entity::content::Playlist;

use crate::context::RequestContext;

/// Adds and removes playlist videos.
#[derive(Debug, Clone)]
pub struct PlaylistService {
    db: DatabasePool,
    playlists: PlaylistRepository,
    videos: VideoRepository,
}

impl PlaylistService {
    /// Creates a new playlist service.
    pub fn new(db: DatabasePool, playlists: PlaylistRepository, videos: VideoRepository) -> Self {
        Self {
            db,
            playlists,
            videos,
        }
    }

    async fn owned(&self, ctx: &RequestContext, playlist_id: PlaylistId) -> AppResult<Playlist> {
        let playlist = self
            .playlists
            .find_by_id(playlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist not found"))?;
        if playlist.owner_id != ctx.user_id {
            return Err(AppError::authorization(
                "You are not the owner of this playlist",
            ));
        }
        Ok(playlist)
    }

    /// Add a video to one of the caller's playlists.
    pub async fn add_video(
        &self,
        ctx: &RequestContext,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Playlist> {
        let playlist = self.owned(ctx, playlist_id).await?;
        self.videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))?;

        let mut tx = self.db.begin().await?;
        let updated = self
            .playlists
            .add_video(&mut tx, playlist.id, video_id)
            .await?
            .ok_or_else(|| AppError::conflict("Video is already in the playlist"))?;
        commit(tx).await?;

        info!(
            playlist_id = %playlist.id,
            video_id = %video_id,
            video_count = updated.video_count,
            "Video added to playlist"
        );
        Ok(updated)
    }

    /// Remove a video from one of the caller's playlists.
    pub async fn remove_video(
        &self,
        ctx: &RequestContext,
        playlist_id: PlaylistId,
        video_id: VideoId,
    ) -> AppResult<Playlist> {
        let playlist = self.owned(ctx, playlist_id).await?;

        let mut tx = self.db.begin().await?;
        let updated = self
            .playlists
            .remove_video(&mut tx, playlist.id, video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video is not in the playlist"))?;
        commit(tx).await?;

        info!(
            playlist_id = %playlist.id,
            video_id = %video_id,
            video_count = updated.video_count,
            "Video removed from playlist"
        );
        Ok(updated)
    }
}
