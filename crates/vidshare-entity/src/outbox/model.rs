//! Outbox entry model.
//!
//! A pending notification written in the same transaction as the action
//! that caused it, later drained by the outbox relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vidshare_core::types::id::{CommentId, NotificationId, OutboxEntryId, UserId, VideoId};

use crate::notification::{NewNotification, NotificationKind};

/// A row of `notification_outbox`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboxEntry {
    /// Entry id; reused as the notification id on delivery.
    pub id: OutboxEntryId,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Sender.
    pub sender_id: UserId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Related video.
    pub video_id: Option<VideoId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Precomposed message.
    pub message: Option<String>,
    /// Delivery attempts so far.
    pub attempts: i32,
    /// Error from the most recent failed attempt.
    pub last_error: Option<String>,
    /// When the entry was enqueued.
    pub created_at: DateTime<Utc>,
    /// Lease expiry while a relay holds the entry.
    pub claimed_until: Option<DateTime<Utc>>,
    /// When the notification was persisted and emitted.
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    /// The notification this entry stands for.
    pub fn to_new_notification(&self) -> NewNotification {
        NewNotification {
            id: NotificationId::from(self.id),
            recipient_id: self.recipient_id,
            sender_id: self.sender_id,
            kind: self.kind,
            video_id: self.video_id,
            comment_id: self.comment_id,
            message: self.message.clone(),
        }
    }
}

/// Data required to enqueue a pending notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutboxEntry {
    /// Notification kind.
    pub kind: NotificationKind,
    /// Sender.
    pub sender_id: UserId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Related video.
    pub video_id: Option<VideoId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Precomposed message.
    pub message: Option<String>,
}

impl NewOutboxEntry {
    /// Build an entry, or `None` when sender and recipient are the same user.
    pub fn between(
        kind: NotificationKind,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> Option<Self> {
        (sender_id != recipient_id).then_some(Self {
            kind,
            sender_id,
            recipient_id,
            video_id: None,
            comment_id: None,
            message: None,
        })
    }

    /// Attach a video reference.
    pub fn with_video(mut self, video_id: VideoId) -> Self {
        self.video_id = Some(video_id);
        self
    }

    /// Attach a comment reference.
    pub fn with_comment(mut self, comment_id: CommentId) -> Self {
        self.comment_id = Some(comment_id);
        self
    }

    /// Attach a precomposed message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
