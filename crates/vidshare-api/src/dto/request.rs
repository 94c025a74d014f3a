//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use vidshare_core::types::id::{CommentId, UserId, VideoId};
use vidshare_entity::content::ReactionType;
use vidshare_entity::notification::NotificationKind;

/// Longest accepted precomposed notification message.
pub const MAX_MESSAGE_CHARS: u64 = 500;

/// Create notification request. The sender is the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Recipient.
    pub recipient: UserId,
    /// Notification kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Related video.
    #[serde(default)]
    pub video: Option<VideoId>,
    /// Related comment.
    #[serde(default)]
    pub comment: Option<CommentId>,
    /// Precomposed message.
    #[serde(default)]
    #[validate(length(max = MAX_MESSAGE_CHARS, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

/// Comment or reply body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment text.
    #[validate(length(min = 1, message = "Comment text is required"))]
    pub text: String,
}

/// Toggle reaction request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReactionRequest {
    /// Reaction type.
    #[serde(rename = "type")]
    pub reaction: ReactionType,
}

/// Add video to playlist request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddPlaylistVideoRequest {
    /// Video to add.
    pub video_id: VideoId,
}
