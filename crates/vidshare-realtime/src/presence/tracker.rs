//! Presence tracker.
//!
//! Counts open connections per user. Only the 0 -> 1 and 1 -> 0 transitions
//! touch the store and broadcast `userStatusChange`. Store writes go through
//! one writer task so they land in the order the transitions happened.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use vidshare_core::types::id::UserId;

use crate::channel::ChannelHandle;
use crate::connection::handle::ConnectionId;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::store::PresenceStore;

enum PresenceWrite {
    Set { user_id: UserId, is_online: bool },
    Barrier(oneshot::Sender<()>),
}

/// Tracks which users have at least one open connection.
#[derive(Debug)]
pub struct PresenceTracker {
    counts: DashMap<UserId, usize>,
    channel: ChannelHandle,
    writes: mpsc::UnboundedSender<PresenceWrite>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for PresenceWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Set { user_id, is_online } => f
                .debug_struct("Set")
                .field("user_id", user_id)
                .field("is_online", is_online)
                .finish(),
            Self::Barrier(_) => f.write_str("Barrier"),
        }
    }
}

impl PresenceTracker {
    /// Create a tracker and spawn its store writer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        store: Arc<dyn PresenceStore>,
        channel: ChannelHandle,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        Self {
            counts: DashMap::new(),
            channel,
            writes: tx,
            metrics,
        }
    }

    /// A connection bound to `user_id` opened.
    ///
    /// The announcement goes out while the user's entry is locked, so a
    /// racing disconnect cannot broadcast offline ahead of it.
    pub fn connected(&self, user_id: UserId, conn_id: ConnectionId) {
        let mut count = self.counts.entry(user_id).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.enqueue(user_id, true);
            self.announce(user_id, true, Some(conn_id));
        }
    }

    /// A connection bound to `user_id` closed.
    pub fn disconnected(&self, user_id: UserId, conn_id: ConnectionId) {
        match self.counts.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let count = entry.get_mut();
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.enqueue(user_id, false);
                    self.announce(user_id, false, None);
                    entry.remove();
                }
            }
            Entry::Vacant(_) => {
                debug!(user_id = %user_id, conn_id = %conn_id, "Disconnect for untracked user");
            }
        }
    }

    /// Whether the user has an open connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.counts.get(&user_id).is_some_and(|c| *c > 0)
    }

    /// Open connections for a user.
    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.counts.get(&user_id).map(|c| *c).unwrap_or(0)
    }

    /// Number of users with an open connection.
    pub fn online_count(&self) -> usize {
        self.counts.iter().filter(|c| *c.value() > 0).count()
    }

    /// Wait until every store write queued so far has been applied.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.writes.send(PresenceWrite::Barrier(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn enqueue(&self, user_id: UserId, is_online: bool) {
        if self
            .writes
            .send(PresenceWrite::Set { user_id, is_online })
            .is_err()
        {
            warn!(user_id = %user_id, is_online, "Presence writer stopped, flag not persisted");
        }
    }

    /// Called with the user's entry locked; must not touch `counts`.
    fn announce(&self, user_id: UserId, is_online: bool, exclude: Option<ConnectionId>) {
        match self.channel.get() {
            Ok(channel) => {
                let reached = channel.broadcast(
                    OutboundMessage::UserStatusChange { user_id, is_online },
                    exclude,
                );
                self.metrics.presence_broadcast();
                debug!(user_id = %user_id, is_online, reached, "Presence change broadcast");
            }
            Err(e) => warn!(user_id = %user_id, error = %e, "Presence change not broadcast"),
        }
    }
}

async fn run_writer(
    store: Arc<dyn PresenceStore>,
    mut rx: mpsc::UnboundedReceiver<PresenceWrite>,
) {
    while let Some(write) = rx.recv().await {
        match write {
            PresenceWrite::Set { user_id, is_online } => {
                if let Err(e) = store.set_online(user_id, is_online).await {
                    warn!(user_id = %user_id, is_online, error = %e, "Failed to persist presence");
                }
            }
            PresenceWrite::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Presence writer stopped");
}
