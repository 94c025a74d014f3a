//! Persistence seam for notifications.

use async_trait::async_trait;

use vidshare_core::result::AppResult;
use vidshare_core::types::id::{NotificationId, UserId};
use vidshare_core::types::pagination::PageBounds;
use vidshare_database::repositories::NotificationRepository;
use vidshare_entity::notification::{NewNotification, Notification, NotificationWithSender};

/// Durable record of notifications.
#[async_trait]
pub trait NotificationLedger: Send + Sync + 'static {
    /// Persist a notification; an existing id returns the stored record.
    async fn insert(&self, new: NewNotification) -> AppResult<Notification>;

    /// Up to `bounds.fetch_limit()` rows for `recipient_id`, newest first,
    /// strictly older than `bounds.after`.
    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        bounds: &PageBounds,
    ) -> AppResult<Vec<NotificationWithSender>>;

    /// Set the read flag if `recipient_id` owns the notification.
    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>>;

    /// Unread notifications for `recipient_id`.
    async fn count_unread(&self, recipient_id: UserId) -> AppResult<i64>;
}

#[async_trait]
impl NotificationLedger for NotificationRepository {
    async fn insert(&self, new: NewNotification) -> AppResult<Notification> {
        NotificationRepository::insert(self, &new).await
    }

    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        bounds: &PageBounds,
    ) -> AppResult<Vec<NotificationWithSender>> {
        NotificationRepository::list_for_recipient(self, recipient_id, bounds).await
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>> {
        NotificationRepository::mark_read(self, id, recipient_id).await
    }

    async fn count_unread(&self, recipient_id: UserId) -> AppResult<i64> {
        NotificationRepository::count_unread(self, recipient_id).await
    }
}
