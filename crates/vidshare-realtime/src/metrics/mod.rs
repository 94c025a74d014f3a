//! Realtime engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters, shared by the channel, presence and dispatcher.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    messages_sent: AtomicU64,
    messages_dropped: AtomicU64,
    messages_received: AtomicU64,
    notifications_dispatched: AtomicU64,
    notifications_suppressed: AtomicU64,
    presence_broadcasts: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection was registered.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was unregistered.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A message was queued on a connection.
    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// A message was dropped on a full buffer.
    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A client frame was received.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification was persisted and emitted.
    pub fn notification_dispatched(&self) {
        self.notifications_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// A self-notification was skipped.
    pub fn notification_suppressed(&self) {
        self.notifications_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// A presence transition was broadcast.
    pub fn presence_broadcast(&self) {
        self.presence_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            notifications_dispatched: self.notifications_dispatched.load(Ordering::Relaxed),
            notifications_suppressed: self.notifications_suppressed.load(Ordering::Relaxed),
            presence_broadcasts: self.presence_broadcasts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered.
    pub connections_total: u64,
    /// Connections currently registered.
    pub connections_active: u64,
    /// Messages queued to clients.
    pub messages_sent: u64,
    /// Messages dropped on full buffers.
    pub messages_dropped: u64,
    /// Frames received from clients.
    pub messages_received: u64,
    /// Notifications persisted and emitted.
    pub notifications_dispatched: u64,
    /// Self-notifications skipped.
    pub notifications_suppressed: u64,
    /// Presence transitions broadcast.
    pub presence_broadcasts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_connections_never_underflow() {
        let m = RealtimeMetrics::new();
        m.connection_closed();
        m.connection_opened();
        m.connection_closed();
        m.connection_closed();
        let snap = m.snapshot();
        assert_eq!(snap.connections_total, 1);
        assert_eq!(snap.connections_active, 0);
    }
}
