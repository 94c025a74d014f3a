//! Video entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::{UserId, VideoId};

/// Video metadata. Media storage is handled elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Unique video identifier.
    pub id: VideoId,
    /// Uploader.
    pub creator_id: UserId,
    /// Title.
    pub title: String,
    /// View counter.
    pub views: i64,
    /// Number of active reactions.
    pub reaction_count: i64,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}
