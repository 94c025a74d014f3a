//! Playlist entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::{PlaylistId, UserId};

/// A user-curated list of videos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique playlist identifier.
    pub id: PlaylistId,
    /// Owner; the only user allowed to change membership.
    pub owner_id: UserId,
    /// Name.
    pub name: String,
    /// Number of member videos.
    pub video_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
