//! The realtime channel: connection registry with targeted and broadcast emit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vidshare_core::config::RealtimeConfig;
use vidshare_core::types::id::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// Result of registering a connection.
#[derive(Debug)]
pub struct Registration {
    /// The new, open connection.
    pub handle: Arc<ConnectionHandle>,
    /// Outbound messages for the socket writer.
    pub receiver: mpsc::Receiver<OutboundMessage>,
    /// Older connections of the same user closed to respect the per-user cap.
    pub evicted: Vec<Arc<ConnectionHandle>>,
}

/// Publish/subscribe transport keyed by user identity.
///
/// Emits never wait: each connection has a bounded buffer and a full buffer
/// drops the message.
#[derive(Debug)]
pub struct RealtimeChannel {
    pool: ConnectionPool,
    config: RealtimeConfig,
    metrics: Arc<RealtimeMetrics>,
}

impl RealtimeChannel {
    /// Creates an empty channel.
    pub fn new(config: RealtimeConfig, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            config,
            metrics,
        }
    }

    /// Registers a connection, optionally bound to a user.
    ///
    /// When the user already holds `max_connections_per_user` connections the
    /// oldest are closed and returned in [`Registration::evicted`].
    pub fn connect(&self, user_id: Option<UserId>) -> Registration {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, tx, self.metrics.clone()));

        let mut evicted = Vec::new();
        if let Some(user_id) = user_id {
            let existing = self.pool.user_connections(&user_id);
            let max = self.config.max_connections_per_user.max(1);
            if existing.len() >= max {
                warn!(
                    user_id = %user_id,
                    count = existing.len(),
                    max,
                    "User at max connections, oldest will be replaced"
                );
                for oldest in existing.iter().take(existing.len() + 1 - max) {
                    oldest.close();
                    if let Some(removed) = self.pool.remove(&oldest.id) {
                        self.metrics.connection_closed();
                        evicted.push(removed);
                    }
                }
            }
        }

        self.pool.add(handle.clone());
        handle.mark_open();
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = ?user_id,
            "WebSocket connection registered"
        );

        Registration {
            handle,
            receiver: rx,
            evicted,
        }
    }

    /// Unregisters a connection.
    ///
    /// Returns the handle if it was still registered, `None` if it had
    /// already been removed (evicted, or closed at shutdown).
    pub fn disconnect(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let handle = self.pool.remove(conn_id)?;
        handle.close();
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = ?handle.user_id,
            "WebSocket connection unregistered"
        );
        Some(handle)
    }

    /// Delivers a message to every connection bound to `user_id`.
    ///
    /// Returns how many connections accepted it; zero connections is not an
    /// error.
    pub fn emit_to_user(&self, user_id: UserId, message: OutboundMessage) -> usize {
        let connections = self.pool.user_connections(&user_id);
        let delivered = connections
            .iter()
            .filter(|conn| conn.send(message.clone()))
            .count();

        debug!(
            user_id = %user_id,
            event = message.event_name(),
            connections = connections.len(),
            delivered,
            "Emitted to user"
        );
        delivered
    }

    /// Delivers a message to every connection except `exclude`.
    pub fn broadcast(&self, message: OutboundMessage, exclude: Option<ConnectionId>) -> usize {
        self.pool
            .all_connections()
            .iter()
            .filter(|conn| Some(conn.id) != exclude)
            .filter(|conn| conn.send(message.clone()))
            .count()
    }

    /// Closes and unregisters every connection.
    pub fn close_all(&self) -> Vec<Arc<ConnectionHandle>> {
        let all = self.pool.all_connections();
        let closed: Vec<_> = all
            .iter()
            .filter_map(|conn| self.disconnect(&conn.id))
            .collect();
        info!(count = closed.len(), "All connections closed");
        closed
    }

    /// Looks up a registered connection.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    /// Every registered connection.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.pool.all_connections()
    }

    /// Whether `user_id` has at least one registered connection.
    pub fn is_connected(&self, user_id: &UserId) -> bool {
        !self.pool.user_connections(user_id).is_empty()
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }
}
