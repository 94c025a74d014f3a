//! Notification ledger repository.

use sqlx::PgPool;

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{NotificationId, UserId};
use vidshare_core::types::pagination::PageBounds;
use vidshare_entity::notification::{NewNotification, Notification, NotificationWithSender};

/// SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Repository for persisted notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a notification with a server-assigned timestamp.
    ///
    /// Inserting an id that already exists returns the stored row unchanged.
    pub async fn insert(&self, new: &NewNotification) -> AppResult<Notification> {
        let inserted = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications \
             (id, recipient_id, sender_id, kind, video_id, comment_id, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO NOTHING RETURNING *",
        )
        .bind(new.id)
        .bind(new.recipient_id)
        .bind(new.sender_id)
        .bind(new.kind)
        .bind(new.video_id)
        .bind(new.comment_id)
        .bind(new.message.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let dangling = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
            if dangling {
                AppError::with_source(
                    ErrorKind::Validation,
                    "Notification references a user or content item that does not exist",
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
            }
        })?;

        match inserted {
            Some(notification) => Ok(notification),
            None => self.find_by_id(new.id).await?.ok_or_else(|| {
                AppError::database("Notification vanished after conflicting insert")
            }),
        }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    /// One page of a recipient's notifications, newest first, with sender
    /// summaries joined in. Fetches `bounds.fetch_limit()` rows.
    pub async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        bounds: &PageBounds,
    ) -> AppResult<Vec<NotificationWithSender>> {
        let (after_ts, after_id) = match bounds.after {
            Some(cursor) => (Some(cursor.created_at), Some(cursor.id)),
            None => (None, None),
        };

        sqlx::query_as::<_, NotificationWithSender>(
            "SELECT n.*, u.username AS sender_username, u.profile_pic AS sender_profile_pic \
             FROM notifications n \
             JOIN users u ON u.id = n.sender_id \
             WHERE n.recipient_id = $1 \
               AND ($2::timestamptz IS NULL OR (n.created_at, n.id) < ($2, $3)) \
             ORDER BY n.created_at DESC, n.id DESC \
             LIMIT $4",
        )
        .bind(recipient_id)
        .bind(after_ts)
        .bind(after_id)
        .bind(bounds.fetch_limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    /// Set the read flag, scoped to the recipient.
    ///
    /// Returns `None` when the notification does not exist or belongs to
    /// someone else.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE \
             WHERE id = $1 AND recipient_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark notification read", e))
    }

    /// Count unread notifications for a recipient.
    pub async fn count_unread(&self, recipient_id: UserId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }
}
