//! Where the relay reads pending entries from.

use async_trait::async_trait;

use vidshare_core::result::AppResult;
use vidshare_core::types::id::OutboxEntryId;
use vidshare_database::repositories::OutboxRepository;
use vidshare_entity::outbox::OutboxEntry;

/// Claimable queue of pending notifications.
#[async_trait]
pub trait OutboxSource: Send + Sync + 'static {
    /// Lease up to `limit` deliverable entries, oldest first.
    async fn claim_batch(
        &self,
        limit: u32,
        lease_seconds: u64,
        max_attempts: i32,
    ) -> AppResult<Vec<OutboxEntry>>;

    /// Record a successful delivery.
    async fn mark_delivered(&self, id: OutboxEntryId) -> AppResult<()>;

    /// Record a failed attempt; a permanent failure retires the entry.
    async fn mark_failed(
        &self,
        id: OutboxEntryId,
        error: &str,
        permanent: bool,
        max_attempts: i32,
    ) -> AppResult<()>;

    /// Drop delivered entries older than `hours`.
    async fn purge_delivered(&self, hours: u64) -> AppResult<u64>;
}

#[async_trait]
impl OutboxSource for OutboxRepository {
    async fn claim_batch(
        &self,
        limit: u32,
        lease_seconds: u64,
        max_attempts: i32,
    ) -> AppResult<Vec<OutboxEntry>> {
        OutboxRepository::claim_batch(self, limit, lease_seconds, max_attempts).await
    }

    async fn mark_delivered(&self, id: OutboxEntryId) -> AppResult<()> {
        OutboxRepository::mark_delivered(self, id).await
    }

    async fn mark_failed(
        &self,
        id: OutboxEntryId,
        error: &str,
        permanent: bool,
        max_attempts: i32,
    ) -> AppResult<()> {
        OutboxRepository::mark_failed(self, id, error, permanent, max_attempts).await
    }

    async fn purge_delivered(&self, hours: u64) -> AppResult<u64> {
        OutboxRepository::purge_delivered(self, hours).await
    }
}
