//! Outbox relay: the main loop that drains pending notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use vidshare_core::config::WorkerConfig;
use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_realtime::notification::{DispatchRequest, NotificationDispatcher};

use crate::source::OutboxSource;

/// Delivered entries are purged at most this often.
const PURGE_EVERY: Duration = Duration::from_secs(3600);

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Entries claimed.
    pub claimed: usize,
    /// Entries delivered (including suppressed self-notifications).
    pub delivered: usize,
    /// Entries that will be retried.
    pub retried: usize,
    /// Entries retired after a permanent failure.
    pub dead: usize,
}

/// Drains the notification outbox into the dispatcher.
pub struct OutboxRelay {
    source: Arc<dyn OutboxSource>,
    dispatcher: Arc<NotificationDispatcher>,
    config: WorkerConfig,
}

impl std::fmt::Debug for OutboxRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboxRelay")
            .field("config", &self.config)
            .finish()
    }
}

/// A dispatch error that no retry can fix.
fn is_permanent(error: &AppError) -> bool {
    !error.is_transient()
}

impl OutboxRelay {
    /// Create a new relay.
    pub fn new(
        source: Arc<dyn OutboxSource>,
        dispatcher: Arc<NotificationDispatcher>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            source,
            dispatcher,
            config,
        }
    }

    /// Run until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            batch_size = self.config.batch_size,
            max_attempts = self.config.max_attempts,
            "Outbox relay started"
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds.max(1));
        let mut next_purge = Instant::now();

        loop {
            if *cancel.borrow() {
                break;
            }

            let full_batch = match self.drain_once().await {
                Ok(stats) => {
                    if stats.claimed > 0 {
                        tracing::debug!(
                            claimed = stats.claimed,
                            delivered = stats.delivered,
                            retried = stats.retried,
                            dead = stats.dead,
                            "Outbox batch processed"
                        );
                    }
                    stats.claimed >= self.config.batch_size as usize
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to claim outbox batch");
                    false
                }
            };

            if Instant::now() >= next_purge {
                match self.source.purge_delivered(self.config.retention_hours).await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!(purged, "Purged delivered outbox entries"),
                    Err(e) => tracing::warn!(error = %e, "Failed to purge outbox"),
                }
                next_purge = Instant::now() + PURGE_EVERY;
            }

            if full_batch {
                continue;
            }

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Outbox relay received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(poll_interval) => {}
            }
        }

        tracing::info!("Outbox relay stopped");
    }

    /// Claim one batch and try to deliver every entry in it.
    pub async fn drain_once(&self) -> AppResult<RelayStats> {
        let entries = self
            .source
            .claim_batch(
                self.config.batch_size,
                self.config.lease_seconds,
                self.config.max_attempts,
            )
            .await?;

        let mut stats = RelayStats {
            claimed: entries.len(),
            ..RelayStats::default()
        };

        for entry in &entries {
            let outcome = self.dispatcher.dispatch(DispatchRequest::from(entry)).await;
            let bookkeeping = match outcome {
                Ok(_) => {
                    stats.delivered += 1;
                    self.source.mark_delivered(entry.id).await
                }
                Err(e) => {
                    let permanent =
                        is_permanent(&e) || entry.attempts + 1 >= self.config.max_attempts;
                    if permanent {
                        stats.dead += 1;
                        tracing::error!(
                            entry_id = %entry.id,
                            kind = %entry.kind,
                            attempts = entry.attempts + 1,
                            error = %e,
                            "Outbox entry failed permanently"
                        );
                    } else {
                        stats.retried += 1;
                        tracing::warn!(
                            entry_id = %entry.id,
                            kind = %entry.kind,
                            attempts = entry.attempts + 1,
                            error = %e,
                            "Outbox entry delivery failed, will retry"
                        );
                    }
                    self.source
                        .mark_failed(entry.id, &e.to_string(), permanent, self.config.max_attempts)
                        .await
                }
            };

            if let Err(e) = bookkeeping {
                tracing::error!(entry_id = %entry.id, error = %e, "Failed to update outbox entry");
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use vidshare_core::config::{NotificationRealtimeConfig, RealtimeConfig};
    use vidshare_core::types::id::{OutboxEntryId, UserId};
    use vidshare_entity::notification::NotificationKind;
    use vidshare_entity::outbox::OutboxEntry;
    use vidshare_realtime::channel::{ChannelHandle, RealtimeChannel};
    use vidshare_realtime::metrics::RealtimeMetrics;
    use vidshare_realtime::notification::MemoryNotificationLedger;

    use super::*;

    #[derive(Default)]
    struct MemoryOutbox {
        entries: Mutex<Vec<OutboxEntry>>,
        purges: Mutex<usize>,
    }

    impl MemoryOutbox {
        async fn push(&self, kind: NotificationKind, sender: UserId, recipient: UserId) -> OutboxEntryId {
            let entry = OutboxEntry {
                id: OutboxEntryId::new(),
                kind,
                sender_id: sender,
                recipient_id: recipient,
                video_id: None,
                comment_id: None,
                message: Some("hello".into()),
                attempts: 0,
                last_error: None,
                created_at: Utc::now(),
                claimed_until: None,
                delivered_at: None,
            };
            let id = entry.id;
            self.entries.lock().await.push(entry);
            id
        }

        async fn get(&self, id: OutboxEntryId) -> OutboxEntry {
            self.entries
                .lock()
                .await
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .expect("entry")
        }
    }

    #[async_trait]
    impl OutboxSource for MemoryOutbox {
        async fn claim_batch(
            &self,
            limit: u32,
            _lease_seconds: u64,
            max_attempts: i32,
        ) -> AppResult<Vec<OutboxEntry>> {
            Ok(self
                .entries
                .lock()
                .await
                .iter()
                .filter(|e| e.delivered_at.is_none() && e.attempts < max_attempts)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn mark_delivered(&self, id: OutboxEntryId) -> AppResult<()> {
            if let Some(e) = self.entries.lock().await.iter_mut().find(|e| e.id == id) {
                e.delivered_at = Some(Utc::now());
                e.attempts += 1;
            }
            Ok(())
        }

        async fn mark_failed(
            &self,
            id: OutboxEntryId,
            error: &str,
            permanent: bool,
            max_attempts: i32,
        ) -> AppResult<()> {
            if let Some(e) = self.entries.lock().await.iter_mut().find(|e| e.id == id) {
                e.attempts = if permanent {
                    (e.attempts + 1).max(max_attempts)
                } else {
                    e.attempts + 1
                };
                e.last_error = Some(error.to_string());
            }
            Ok(())
        }

        async fn purge_delivered(&self, _hours: u64) -> AppResult<u64> {
            *self.purges.lock().await += 1;
            Ok(0)
        }
    }

    struct Fixture {
        outbox: Arc<MemoryOutbox>,
        ledger: Arc<MemoryNotificationLedger>,
        relay: OutboxRelay,
    }

    fn fixture(max_attempts: i32) -> Fixture {
        let metrics = Arc::new(RealtimeMetrics::new());
        let handle = ChannelHandle::new();
        handle
            .init(Arc::new(RealtimeChannel::new(RealtimeConfig::default(), metrics.clone())))
            .expect("init");
        let ledger = Arc::new(MemoryNotificationLedger::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            ledger.clone(),
            handle,
            metrics,
            NotificationRealtimeConfig::default(),
        ));
        let outbox = Arc::new(MemoryOutbox::default());
        let relay = OutboxRelay::new(
            outbox.clone(),
            dispatcher,
            WorkerConfig {
                max_attempts,
                ..WorkerConfig::default()
            },
        );
        Fixture {
            outbox,
            ledger,
            relay,
        }
    }

    #[tokio::test]
    async fn test_delivered_entry_becomes_notification_with_same_id() {
        let f = fixture(3);
        let ann = f.ledger.add_named_user("ann");
        let bob = f.ledger.add_named_user("bob");
        let id = f.outbox.push(NotificationKind::Follow, ann, bob).await;

        let stats = f.relay.drain_once().await.expect("drain");
        assert_eq!(stats.delivered, 1);

        let stored = f.ledger.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.into_uuid(), id.into_uuid());
        assert!(f.outbox.get(id).await.delivered_at.is_some());

        let again = f.relay.drain_once().await.expect("drain");
        assert_eq!(again.claimed, 0);
    }

    #[tokio::test]
    async fn test_redelivery_does_not_duplicate() {
        let f = fixture(3);
        let ann = f.ledger.add_named_user("ann");
        let bob = f.ledger.add_named_user("bob");
        let id = f.outbox.push(NotificationKind::Follow, ann, bob).await;

        f.relay.drain_once().await.expect("first");
        // Simulate a crash between dispatch and bookkeeping.
        f.outbox.entries.lock().await[0].delivered_at = None;
        f.relay.drain_once().await.expect("second");

        assert_eq!(f.ledger.all().await.len(), 1);
        assert!(f.outbox.get(id).await.delivered_at.is_some());
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_until_limit() {
        let f = fixture(2);
        let ann = f.ledger.add_named_user("ann");
        let bob = f.ledger.add_named_user("bob");
        let id = f.outbox.push(NotificationKind::Follow, ann, bob).await;
        f.ledger.fail_inserts(true);

        let first = f.relay.drain_once().await.expect("drain");
        assert_eq!(first.retried, 1);
        assert_eq!(f.outbox.get(id).await.attempts, 1);

        let second = f.relay.drain_once().await.expect("drain");
        assert_eq!(second.dead, 1);
        assert_eq!(f.relay.drain_once().await.expect("drain").claimed, 0);
        assert!(f.outbox.get(id).await.last_error.is_some());
    }

    #[tokio::test]
    async fn test_invalid_entry_is_retired_immediately() {
        let f = fixture(5);
        let ann = f.ledger.add_named_user("ann");
        let bob = f.ledger.add_named_user("bob");
        // A comment notification without references can never succeed.
        let id = f.outbox.push(NotificationKind::Comment, ann, bob).await;

        let stats = f.relay.drain_once().await.expect("drain");
        assert_eq!(stats.dead, 1);
        assert_eq!(f.outbox.get(id).await.attempts, 5);
        assert!(f.ledger.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_self_entry_is_marked_delivered_without_notification() {
        let f = fixture(3);
        let ann = f.ledger.add_named_user("ann");
        let id = f.outbox.push(NotificationKind::Follow, ann, ann).await;

        let stats = f.relay.drain_once().await.expect("drain");
        assert_eq!(stats.delivered, 1);
        assert!(f.ledger.all().await.is_empty());
        assert!(f.outbox.get(id).await.delivered_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel_and_purges() {
        let f = fixture(3);
        let relay = Arc::new(f.relay);
        let (tx, rx) = watch::channel(false);

        let task = {
            let relay = relay.clone();
            tokio::spawn(async move { relay.run(rx).await })
        };
        time::sleep(Duration::from_secs(3)).await;
        tx.send(true).expect("cancel");
        task.await.expect("relay task");

        assert_eq!(*f.outbox.purges.lock().await, 1);
    }
}
