//! Notification outbox repository.
//!
//! Entries are enqueued inside the caller's transaction and claimed by the
//! relay with a lease, so several relays can drain concurrently.

use sqlx::{PgPool, Postgres, Transaction};

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::OutboxEntryId;
use vidshare_entity::outbox::{NewOutboxEntry, OutboxEntry};

/// Repository for pending notifications.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: PgPool,
}

impl OutboxRepository {
    /// Create a new outbox repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a pending notification in the caller's transaction.
    pub async fn enqueue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &NewOutboxEntry,
    ) -> AppResult<OutboxEntryId> {
        let id = OutboxEntryId::new();
        sqlx::query(
            "INSERT INTO notification_outbox \
             (id, kind, sender_id, recipient_id, video_id, comment_id, message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(entry.kind)
        .bind(entry.sender_id)
        .bind(entry.recipient_id)
        .bind(entry.video_id)
        .bind(entry.comment_id)
        .bind(entry.message.as_deref())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue notification", e))?;
        Ok(id)
    }

    /// Claim up to `limit` undelivered entries, oldest first, for `lease_seconds`.
    ///
    /// Entries at or beyond `max_attempts` are left alone.
    pub async fn claim_batch(
        &self,
        limit: u32,
        lease_seconds: u64,
        max_attempts: i32,
    ) -> AppResult<Vec<OutboxEntry>> {
        let mut entries = sqlx::query_as::<_, OutboxEntry>(
            "UPDATE notification_outbox \
             SET claimed_until = NOW() + make_interval(secs => $2) \
             WHERE id IN ( \
                 SELECT id FROM notification_outbox \
                 WHERE delivered_at IS NULL \
                   AND attempts < $3 \
                   AND (claimed_until IS NULL OR claimed_until < NOW()) \
                 ORDER BY created_at \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED) \
             RETURNING *",
        )
        .bind(i64::from(limit))
        .bind(lease_seconds as f64)
        .bind(max_attempts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim outbox batch", e))?;

        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    /// Mark an entry delivered.
    pub async fn mark_delivered(&self, id: OutboxEntryId) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_outbox \
             SET delivered_at = NOW(), claimed_until = NULL, attempts = attempts + 1 \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark entry delivered", e))?;
        Ok(())
    }

    /// Record a failed attempt and release the lease.
    ///
    /// A permanent failure jumps `attempts` to `max_attempts` so the entry is
    /// never claimed again.
    pub async fn mark_failed(
        &self,
        id: OutboxEntryId,
        error: &str,
        permanent: bool,
        max_attempts: i32,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_outbox \
             SET attempts = CASE WHEN $3 THEN GREATEST(attempts + 1, $4) ELSE attempts + 1 END, \
                 last_error = $2, claimed_until = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(permanent)
        .bind(max_attempts)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark entry failed", e))?;
        Ok(())
    }

    /// Delete delivered entries older than `hours`.
    pub async fn purge_delivered(&self, hours: u64) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notification_outbox \
             WHERE delivered_at IS NOT NULL \
               AND delivered_at < NOW() - make_interval(hours => $1)",
        )
        .bind(i32::try_from(hours).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge outbox", e))?;
        Ok(result.rows_affected())
    }

    /// Number of undelivered entries still eligible for delivery.
    pub async fn pending_count(&self, max_attempts: i32) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notification_outbox \
             WHERE delivered_at IS NULL AND attempts < $1",
        )
        .bind(max_attempts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count outbox", e))
    }
}
