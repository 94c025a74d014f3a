//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::{CommentId, NotificationId, UserId, VideoId};
use vidshare_core::types::pagination::Cursor;

use super::kind::NotificationKind;

/// A persisted notification.
///
/// This is the payload of the `receiveNotification` realtime event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Who receives the notification.
    #[serde(rename = "recipient")]
    pub recipient_id: UserId,
    /// Who caused it. Never equal to `recipient_id`.
    #[serde(rename = "sender")]
    pub sender_id: UserId,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Related video, if any.
    #[serde(rename = "video")]
    pub video_id: Option<VideoId>,
    /// Related comment, if any.
    #[serde(rename = "comment")]
    pub comment_id: Option<CommentId>,
    /// Precomposed text (follow and reaction kinds).
    pub message: Option<String>,
    /// Read flag; starts false and only ever flips to true.
    pub is_read: bool,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Pagination position of this notification.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id.into_uuid())
    }
}

/// Data required to persist a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Id to persist under. Re-inserting the same id is a no-op.
    pub id: NotificationId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Sender.
    pub sender_id: UserId,
    /// Kind.
    pub kind: NotificationKind,
    /// Related video.
    pub video_id: Option<VideoId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Message.
    pub message: Option<String>,
}

impl NewNotification {
    /// Materialize the record as it will be stored.
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.recipient_id,
            sender_id: self.sender_id,
            kind: self.kind,
            video_id: self.video_id,
            comment_id: self.comment_id,
            message: self.message,
            is_read: false,
            created_at,
        }
    }
}

/// A notification joined with its sender's public profile, as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationWithSender {
    /// The notification itself.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub notification: Notification,
    /// Sender's display name.
    pub sender_username: String,
    /// Sender's avatar reference.
    pub sender_profile_pic: Option<String>,
}

impl NotificationWithSender {
    /// Pagination position of this row.
    pub fn cursor(&self) -> Cursor {
        self.notification.cursor()
    }
}
