//! Comment, like, reaction and view handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use vidshare_core::types::id::{CommentId, VideoId};
use vidshare_entity::content::{Comment, Video};
use vidshare_service::content::{CommentLike, ReactionOutcome};

use crate::dto::request::{CommentRequest, ReactionRequest};
use crate::dto::response::ApiResponse;
use crate::error::HttpAppError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /api/videos/{id}/comments
pub async fn comment_on_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), HttpAppError> {
    let video_id: VideoId = parse_id(&id)?;
    let comment = state
        .comment_service
        .comment_on_video(&auth, video_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

/// POST /api/comments/{id}/replies
pub async fn reply_to_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), HttpAppError> {
    let parent_id: CommentId = parse_id(&id)?;
    let reply = state
        .comment_service
        .reply_to_comment(&auth, parent_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reply))))
}

/// POST /api/comments/{id}/like
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CommentLike>>, HttpAppError> {
    let comment_id: CommentId = parse_id(&id)?;
    let outcome = state.comment_service.toggle_like(&auth, comment_id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/videos/{id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReactionRequest>,
) -> Result<Json<ApiResponse<ReactionOutcome>>, HttpAppError> {
    let video_id: VideoId = parse_id(&id)?;
    let outcome = state
        .video_service
        .toggle_reaction(&auth, video_id, req.reaction)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/videos/{id}/views
pub async fn record_view(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Video>>, HttpAppError> {
    let video_id: VideoId = parse_id(&id)?;
    let video = state.video_service.record_view(video_id).await?;
    Ok(Json(ApiResponse::ok(video)))
}
