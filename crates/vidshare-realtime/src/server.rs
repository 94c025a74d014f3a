//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vidshare_auth::jwt::JwtDecoder;
use vidshare_core::config::RealtimeConfig;
use vidshare_core::error::{AppError, ErrorKind};

use crate::channel::{ChannelHandle, RealtimeChannel, Registration};
use crate::connection::authenticator::{AuthenticatedConnection, WsAuthenticator};
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::heartbeat::run_heartbeat;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::metrics::RealtimeMetrics;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::ledger::NotificationLedger;
use crate::presence::store::PresenceStore;
use crate::presence::tracker::PresenceTracker;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Late-bound channel shared with the dispatcher and presence tracker.
    pub channel: ChannelHandle,
    /// Notification dispatcher.
    pub notifications: Arc<NotificationDispatcher>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Handshake authenticator.
    pub authenticator: WsAuthenticator,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("initialized", &self.channel.is_initialized())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine. The channel stays unbound until [`Self::start`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: RealtimeConfig,
        ledger: Arc<dyn NotificationLedger>,
        presence_store: Arc<dyn PresenceStore>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let metrics = Arc::new(RealtimeMetrics::new());
        let channel = ChannelHandle::new();

        let presence = Arc::new(PresenceTracker::new(
            presence_store,
            channel.clone(),
            metrics.clone(),
        ));
        let notifications = Arc::new(NotificationDispatcher::new(
            ledger,
            channel.clone(),
            metrics.clone(),
            config.notifications.clone(),
        ));

        Self {
            channel,
            notifications,
            presence,
            authenticator: WsAuthenticator::new(decoder),
            metrics,
            config,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Bind the realtime channel and start the heartbeat.
    ///
    /// Fails with a conflict if the engine was already started.
    pub fn start(&self) -> Result<(), AppError> {
        let channel = Arc::new(RealtimeChannel::new(
            self.config.clone(),
            self.metrics.clone(),
        ));
        self.channel.init(channel.clone())?;

        if self.config.ping_interval_seconds > 0 {
            tokio::spawn(run_heartbeat(
                channel,
                Duration::from_secs(self.config.ping_interval_seconds),
                self.shutdown_receiver(),
            ));
        }

        info!("Real-time engine initialized");
        Ok(())
    }

    /// Register a connection and update presence for its identity.
    pub fn connect(
        &self,
        identity: Option<&AuthenticatedConnection>,
    ) -> Result<Registration, AppError> {
        let channel = self.channel.get()?;
        let user_id = identity.map(|i| i.user_id);
        let registration = channel.connect(user_id);

        if let Some(user_id) = user_id {
            self.presence.connected(user_id, registration.handle.id);
            for evicted in &registration.evicted {
                self.presence.disconnected(user_id, evicted.id);
            }
        }
        Ok(registration)
    }

    /// Unregister a connection. Safe to call for an already removed one.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let Ok(channel) = self.channel.get() else {
            return;
        };
        if let Some(handle) = channel.disconnect(conn_id) {
            if let Some(user_id) = handle.user_id {
                self.presence.disconnected(user_id, handle.id);
            }
        }
    }

    /// Handle one text frame from a client.
    pub async fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        handle.touch();
        self.metrics.message_received();

        let message = match serde_json::from_str::<InboundMessage>(raw) {
            Ok(m) => m,
            Err(e) => {
                handle.send(OutboundMessage::error(
                    "INVALID_MESSAGE",
                    format!("Failed to parse message: {e}"),
                ));
                return;
            }
        };

        match message {
            InboundMessage::Pong => {}
            InboundMessage::MarkRead { notification_id } => {
                let Some(user_id) = handle.user_id else {
                    handle.send(OutboundMessage::error(
                        "UNAUTHENTICATED",
                        "Anonymous connections cannot mark notifications read",
                    ));
                    return;
                };
                match self.notifications.mark_read(notification_id, user_id).await {
                    Ok(_) => {
                        debug!(conn_id = %handle.id, notification_id = %notification_id, "Marked read over socket");
                    }
                    Err(e) => {
                        let code = match e.kind {
                            ErrorKind::NotFound => "NOT_FOUND",
                            _ => "INTERNAL",
                        };
                        handle.send(OutboundMessage::error(code, e.message));
                    }
                }
            }
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Stop background tasks, close every connection and flush presence.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown_tx.send_replace(true);

        match self.channel.get() {
            Ok(channel) => {
                for handle in channel.close_all() {
                    if let Some(user_id) = handle.user_id {
                        self.presence.disconnected(user_id, handle.id);
                    }
                }
            }
            Err(e) => warn!(error = %e, "Shutdown before channel initialization"),
        }
        self.presence.settle().await;

        info!("Real-time engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use vidshare_auth::jwt::JwtEncoder;
    use vidshare_core::config::AuthConfig;
    use vidshare_core::types::id::UserId;
    use vidshare_entity::notification::NotificationKind;

    use super::*;
    use crate::notification::dispatcher::DispatchRequest;
    use crate::notification::memory::MemoryNotificationLedger;
    use crate::presence::memory::MemoryPresenceStore;

    struct Fixture {
        engine: RealtimeEngine,
        ledger: Arc<MemoryNotificationLedger>,
        store: Arc<MemoryPresenceStore>,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(MemoryNotificationLedger::new());
        let store = Arc::new(MemoryPresenceStore::new());
        let config = RealtimeConfig {
            ping_interval_seconds: 0,
            ..RealtimeConfig::default()
        };
        let engine = RealtimeEngine::new(
            config,
            ledger.clone(),
            store.clone(),
            Arc::new(JwtDecoder::new(&AuthConfig::default())),
        );
        Fixture {
            engine,
            ledger,
            store,
        }
    }

    fn identity(user_id: UserId) -> AuthenticatedConnection {
        AuthenticatedConnection {
            user_id,
            username: "someone".into(),
        }
    }

    #[tokio::test]
    async fn test_connect_requires_start() {
        let f = fixture();
        let err = f.engine.connect(None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);

        f.engine.start().expect("start");
        assert!(f.engine.connect(None).is_ok());
        assert_eq!(f.engine.start().unwrap_err().kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_connect_disconnect_drive_presence() {
        let f = fixture();
        f.engine.start().expect("start");
        let user = UserId::new();
        let mut watcher = f.engine.connect(None).expect("anon");

        let reg = f.engine.connect(Some(&identity(user))).expect("connect");
        assert_eq!(
            watcher.receiver.recv().await,
            Some(OutboundMessage::UserStatusChange {
                user_id: user,
                is_online: true
            })
        );

        f.engine.disconnect(&reg.handle.id);
        f.engine.disconnect(&reg.handle.id);
        assert_eq!(
            watcher.receiver.recv().await,
            Some(OutboundMessage::UserStatusChange {
                user_id: user,
                is_online: false
            })
        );

        f.engine.presence.settle().await;
        assert_eq!(f.store.writes().await, vec![(user, true), (user, false)]);
    }

    #[tokio::test]
    async fn test_eviction_keeps_user_online() {
        let ledger = Arc::new(MemoryNotificationLedger::new());
        let store = Arc::new(MemoryPresenceStore::new());
        let engine = RealtimeEngine::new(
            RealtimeConfig {
                max_connections_per_user: 1,
                ping_interval_seconds: 0,
                ..RealtimeConfig::default()
            },
            ledger,
            store.clone(),
            Arc::new(JwtDecoder::new(&AuthConfig::default())),
        );
        engine.start().expect("start");
        let user = UserId::new();

        let first = engine.connect(Some(&identity(user))).expect("first");
        let second = engine.connect(Some(&identity(user))).expect("second");
        assert_eq!(second.evicted.len(), 1);
        engine.disconnect(&first.handle.id);

        assert!(engine.presence.is_online(user));
        engine.presence.settle().await;
        assert_eq!(store.writes().await, vec![(user, true)]);
    }

    #[tokio::test]
    async fn test_inbound_mark_read_and_errors() {
        let f = fixture();
        f.engine.start().expect("start");
        let ann = f.ledger.add_named_user("ann");
        let bob = f.ledger.add_named_user("bob");
        let n = f
            .engine
            .notifications
            .dispatch(
                DispatchRequest::new(NotificationKind::Follow, ann, bob)
                    .with_message("ann has followed you."),
            )
            .await
            .expect("dispatch")
            .expect("created");

        let mut bob_conn = f.engine.connect(Some(&identity(bob))).expect("bob");
        let frame = format!(r#"{{"event":"markRead","data":{{"notificationId":"{}"}}}}"#, n.id);
        f.engine.handle_inbound(&bob_conn.handle, &frame).await;
        assert_eq!(f.engine.notifications.unread_count(bob).await.expect("count"), 0);

        f.engine.handle_inbound(&bob_conn.handle, "not json").await;
        match bob_conn.receiver.recv().await {
            Some(OutboundMessage::Error { code, .. }) => assert_eq!(code, "INVALID_MESSAGE"),
            other => panic!("unexpected frame: {other:?}"),
        }

        let mut ann_conn = f.engine.connect(Some(&identity(ann))).expect("ann");
        f.engine.handle_inbound(&ann_conn.handle, &frame).await;
        match ann_conn.receiver.recv().await {
            Some(OutboundMessage::Error { code, .. }) => assert_eq!(code, "NOT_FOUND"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_connections_and_flushes_presence() {
        let f = fixture();
        f.engine.start().expect("start");
        let user = UserId::new();
        let reg = f.engine.connect(Some(&identity(user))).expect("connect");
        let mut shutdown = f.engine.shutdown_receiver();

        f.engine.shutdown().await;

        assert!(!reg.handle.is_open());
        assert!(*shutdown.borrow_and_update());
        assert!(!f.store.is_online(user));
        assert!(!f.engine.presence.is_online(user));
    }

    #[tokio::test]
    async fn test_handshake_token_round_trip() {
        let f = fixture();
        let user = UserId::new();
        let (token, _) = JwtEncoder::new(&AuthConfig::default())
            .generate_access_token(user, "carol")
            .expect("sign");
        let identity = f
            .engine
            .authenticator
            .authenticate(Some(&token))
            .expect("verified")
            .expect("identity");
        assert_eq!(identity.user_id, user);
    }
}
