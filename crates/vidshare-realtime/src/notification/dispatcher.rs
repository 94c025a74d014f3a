//! Notification dispatcher: persist, then push to the recipient.

use std::sync::Arc;

use tracing::{debug, info};

use vidshare_core::config::NotificationRealtimeConfig;
use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{CommentId, NotificationId, UserId, VideoId};
use vidshare_core::types::pagination::{CursorPage, CursorRequest};
use vidshare_entity::notification::{
    NewNotification, Notification, NotificationKind, NotificationWithSender,
};
use vidshare_entity::outbox::OutboxEntry;

use crate::channel::ChannelHandle;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::ledger::NotificationLedger;

/// A triggering event to turn into a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Fixed id for idempotent re-dispatch; a fresh id when absent.
    pub id: Option<NotificationId>,
    /// Kind.
    pub kind: NotificationKind,
    /// Who acted.
    pub sender_id: UserId,
    /// Who is told.
    pub recipient_id: UserId,
    /// Related video.
    pub video_id: Option<VideoId>,
    /// Related comment.
    pub comment_id: Option<CommentId>,
    /// Precomposed message.
    pub message: Option<String>,
}

impl DispatchRequest {
    /// A request with no references or message.
    pub fn new(kind: NotificationKind, sender_id: UserId, recipient_id: UserId) -> Self {
        Self {
            id: None,
            kind,
            sender_id,
            recipient_id,
            video_id: None,
            comment_id: None,
            message: None,
        }
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

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Persist under a fixed id.
    pub fn with_id(mut self, id: NotificationId) -> Self {
        self.id = Some(id);
        self
    }

    fn validate(&self) -> AppResult<()> {
        if self.kind.requires_video() && self.video_id.is_none() {
            return Err(AppError::validation(format!(
                "A {} notification must reference a video",
                self.kind
            )));
        }
        if self.kind.requires_comment() && self.comment_id.is_none() {
            return Err(AppError::validation(format!(
                "A {} notification must reference a comment",
                self.kind
            )));
        }
        Ok(())
    }
}

impl From<&OutboxEntry> for DispatchRequest {
    fn from(entry: &OutboxEntry) -> Self {
        let new = entry.to_new_notification();
        Self {
            id: Some(new.id),
            kind: new.kind,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            video_id: new.video_id,
            comment_id: new.comment_id,
            message: new.message,
        }
    }
}

/// Creates notifications and delivers them over the realtime channel.
pub struct NotificationDispatcher {
    ledger: Arc<dyn NotificationLedger>,
    channel: ChannelHandle,
    metrics: Arc<RealtimeMetrics>,
    config: NotificationRealtimeConfig,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channel", &self.channel)
            .field("config", &self.config)
            .finish()
    }
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        ledger: Arc<dyn NotificationLedger>,
        channel: ChannelHandle,
        metrics: Arc<RealtimeMetrics>,
        config: NotificationRealtimeConfig,
    ) -> Self {
        Self {
            ledger,
            channel,
            metrics,
            config,
        }
    }

    /// Persist a notification and push it to the recipient's connections.
    ///
    /// Returns `Ok(None)` without side effects when sender and recipient are
    /// the same user. Delivery is best effort; persistence errors propagate.
    pub async fn dispatch(&self, request: DispatchRequest) -> AppResult<Option<Notification>> {
        if request.sender_id == request.recipient_id {
            self.metrics.notification_suppressed();
            debug!(
                user_id = %request.sender_id,
                kind = %request.kind,
                "Self-notification suppressed"
            );
            return Ok(None);
        }
        request.validate()?;
        let channel = self.channel.get()?;

        let new = NewNotification {
            id: request.id.unwrap_or_default(),
            recipient_id: request.recipient_id,
            sender_id: request.sender_id,
            kind: request.kind,
            video_id: request.video_id,
            comment_id: request.comment_id,
            message: request.message,
        };
        let notification = self.ledger.insert(new).await?;

        let delivered = channel.emit_to_user(
            notification.recipient_id,
            OutboundMessage::ReceiveNotification(notification.clone()),
        );
        self.metrics.notification_dispatched();

        info!(
            notification_id = %notification.id,
            kind = %notification.kind,
            sender_id = %notification.sender_id,
            recipient_id = %notification.recipient_id,
            delivered,
            "Notification dispatched"
        );
        Ok(Some(notification))
    }

    /// Mark a notification read on behalf of its recipient.
    ///
    /// Someone else's notification is reported as not found.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        actor_id: UserId,
    ) -> AppResult<Notification> {
        self.ledger
            .mark_read(id, actor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// One page of the user's notifications, newest first.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        request: &CursorRequest,
    ) -> AppResult<CursorPage<NotificationWithSender>> {
        let bounds = request.resolve(self.config.default_page_size, self.config.max_page_size)?;
        let rows = self.ledger.list_for_recipient(user_id, &bounds).await?;
        Ok(CursorPage::from_overfetch(
            rows,
            &bounds,
            NotificationWithSender::cursor,
        ))
    }

    /// Unread notifications for the user.
    pub async fn unread_count(&self, user_id: UserId) -> AppResult<i64> {
        self.ledger.count_unread(user_id).await
    }
}
