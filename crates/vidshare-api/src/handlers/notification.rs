//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use vidshare_core::types::id::NotificationId;
use vidshare_core::types::pagination::{CursorPage, CursorRequest};
use vidshare_entity::notification::{Notification, NotificationWithSender};
use vidshare_realtime::notification::DispatchRequest;

use crate::dto::request::CreateNotificationRequest;
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::HttpAppError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /api/notifications
///
/// 201 with the record, or 200 with `null` when the caller addressed themself.
pub async fn create_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Option<Notification>>>), HttpAppError> {
    let mut request = DispatchRequest::new(req.kind, auth.user_id, req.recipient);
    if let Some(video) = req.video {
        request = request.with_video(video);
    }
    if let Some(comment) = req.comment {
        request = request.with_comment(comment);
    }
    if let Some(message) = req.message {
        request = request.with_message(message);
    }

    let created = state.realtime.notifications.dispatch(request).await?;
    let status = if created.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::ok(created))))
}

/// GET /api/notifications?cursor=&limit=
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CursorRequest>,
) -> Result<Json<ApiResponse<CursorPage<NotificationWithSender>>>, HttpAppError> {
    let page = state
        .realtime
        .notifications
        .list_for_user(auth.user_id, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, HttpAppError> {
    let count = state.realtime.notifications.unread_count(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Notification>>, HttpAppError> {
    let id: NotificationId = parse_id(&id)?;
    let notification = state
        .realtime
        .notifications
        .mark_read(id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(notification)))
}
