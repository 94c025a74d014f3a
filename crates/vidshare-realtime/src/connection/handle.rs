//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use vidshare_core::types::id::UserId;

use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Lifecycle of a connection. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Created but not yet registered.
    Connecting = 0,
    /// Registered and receiving events.
    Open = 1,
    /// Closed; never reopened.
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// A handle to a single WebSocket connection.
///
/// Holds the sender for pushing messages to the client plus the identity
/// bound at handshake. Anonymous connections have no `user_id` and only
/// receive broadcasts.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity bound at handshake.
    pub user_id: Option<UserId>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    state: AtomicU8,
    last_seen_ms: AtomicI64,
    closed_tx: watch::Sender<bool>,
    metrics: Arc<RealtimeMetrics>,
}

impl ConnectionHandle {
    /// Create a new connection handle in the `Connecting` state.
    pub fn new(
        user_id: Option<UserId>,
        sender: mpsc::Sender<OutboundMessage>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        let now = Utc::now();
        let (closed_tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: now,
            sender,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            last_seen_ms: AtomicI64::new(now.timestamp_millis()),
            closed_tx,
            metrics,
        }
    }

    /// Queue a message without waiting.
    ///
    /// Returns whether the message was queued. A full buffer drops the
    /// message; a gone receiver closes the connection.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if self.state() != ConnectionState::Open {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => {
                self.metrics.message_sent();
                true
            }
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    event = msg.event_name(),
                    "Connection send buffer full, dropping message"
                );
                self.metrics.message_dropped();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                false
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Whether the connection can still receive messages.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Move from `Connecting` to `Open`. Has no effect on a closed handle.
    pub fn mark_open(&self) {
        let _ = self.state.compare_exchange(
            ConnectionState::Connecting as u8,
            ConnectionState::Open as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Close the connection and wake anything waiting in [`Self::closed`].
    pub fn close(&self) {
        let previous = self
            .state
            .swap(ConnectionState::Closed as u8, Ordering::SeqCst);
        if previous != ConnectionState::Closed as u8 {
            self.closed_tx.send_replace(true);
        }
    }

    /// Resolves once the connection is closed.
    pub async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Record client activity.
    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Milliseconds since the client was last heard from.
    pub fn idle_millis(&self) -> i64 {
        Utc::now().timestamp_millis() - self.last_seen_ms.load(Ordering::Relaxed)
    }
}
