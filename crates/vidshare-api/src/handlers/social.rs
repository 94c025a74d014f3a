//! Follow graph handlers.

use axum::Json;
use axum::extract::{Path, State};

use vidshare_core::types::id::UserId;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::HttpAppError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// POST /api/users/{id}/follow
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, HttpAppError> {
    let target: UserId = parse_id(&id)?;
    state.social_service.follow(&auth, target).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User followed successfully",
    ))))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, HttpAppError> {
    let target: UserId = parse_id(&id)?;
    state.social_service.unfollow(&auth, target).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User unfollowed successfully",
    ))))
}
