//! Ping heartbeat and idle-connection reaping.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time;

use crate::channel::RealtimeChannel;
use crate::message::types::OutboundMessage;

/// Run the heartbeat loop until shutdown.
///
/// Every `interval` each connection is pinged. A connection silent for more
/// than two intervals is closed; its socket task then unregisters it.
pub async fn run_heartbeat(
    channel: Arc<RealtimeChannel>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    let timeout_ms = i64::try_from(interval.as_millis().saturating_mul(2)).unwrap_or(i64::MAX);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        for conn in channel.all_connections() {
            if conn.idle_millis() > timeout_ms {
                tracing::warn!(conn_id = %conn.id, "Connection heartbeat timeout");
                conn.close();
            }
        }

        channel.broadcast(
            OutboundMessage::Ping {
                timestamp: Utc::now().timestamp_millis(),
            },
            None,
        );
    }

    tracing::debug!("Heartbeat loop ended");
}
