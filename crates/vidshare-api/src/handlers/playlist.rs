//! Playlist membership handlers.

use axum::Json;
use axum::extract::{Path, State};

use vidshare_core::types::id::{PlaylistId, VideoId};
use vidshare_entity::content::Playlist;

use crate::dto::request::AddPlaylistVideoRequest;
use crate::dto::response::ApiResponse;
use crate::error::HttpAppError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /api/playlists/{id}/videos
pub async fn add_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddPlaylistVideoRequest>,
) -> Result<Json<ApiResponse<Playlist>>, HttpAppError> {
    let playlist_id: PlaylistId = parse_id(&id)?;
    let playlist = state
        .playlist_service
        .add_video(&auth, playlist_id, req.video_id)
        .await?;
    Ok(Json(ApiResponse::ok(playlist)))
}

/// DELETE /api/playlists/{id}/videos/{video_id}
pub async fn remove_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, video_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Playlist>>, HttpAppError> {
    let playlist_id: PlaylistId = parse_id(&id)?;
    let video_id: VideoId = parse_id(&video_id)?;
    let playlist = state
        .playlist_service
        .remove_video(&auth, playlist_id, video_id)
        .await?;
    Ok(Json(ApiResponse::ok(playlist)))
}
