//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::{CommentId, UserId, VideoId};

/// A comment on a video, or a reply when `parent_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment identifier.
    pub id: CommentId,
    /// Video the thread belongs to.
    pub video_id: VideoId,
    /// Author.
    pub author_id: UserId,
    /// Parent comment for replies.
    pub parent_id: Option<CommentId>,
    /// Body text.
    pub text: String,
    /// Number of likes.
    pub like_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this comment is a reply.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}
