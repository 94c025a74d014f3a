//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::UserId;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Avatar reference.
    pub profile_pic: Option<String>,
    /// Presence flag, owned by the presence tracker.
    pub is_online: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Project the public summary shown next to notifications.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            profile_pic: self.profile_pic.clone(),
        }
    }
}

/// Public profile fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Avatar reference.
    pub profile_pic: Option<String>,
}

/// A follow edge: `follower_id` follows `followee_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    /// The user doing the following.
    pub follower_id: UserId,
    /// The user being followed.
    pub followee_id: UserId,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}
