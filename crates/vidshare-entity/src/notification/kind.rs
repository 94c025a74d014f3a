//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use vidshare_core::AppError;

/// What happened to trigger a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone liked the recipient's comment.
    Like,
    /// Someone replied to the recipient's comment.
    Reply,
    /// Someone commented on the recipient's video.
    Comment,
    /// Someone reacted to the recipient's video.
    Reaction,
    /// Someone followed the recipient.
    Follow,
}

impl NotificationKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Like,
        Self::Reply,
        Self::Comment,
        Self::Reaction,
        Self::Follow,
    ];

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Reply => "reply",
            Self::Comment => "comment",
            Self::Reaction => "reaction",
            Self::Follow => "follow",
        }
    }

    /// Whether a notification of this kind must reference a video.
    pub fn requires_video(&self) -> bool {
        matches!(self, Self::Comment | Self::Reaction)
    }

    /// Whether a notification of this kind must reference a comment.
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::Like | Self::Reply | Self::Comment)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid notification type: '{s}'. Expected one of: like, reply, comment, reaction, follow"
                ))
            })
    }
}
