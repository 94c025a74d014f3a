//! # vidshare-realtime
//!
//! Real-time WebSocket engine for VidShare. Provides:
//!
//! - A user-keyed connection channel with targeted emit and broadcast
//! - Reference-counted presence tracking mirrored into the user directory
//! - Notification dispatch: persist, then push to the recipient's connections
//! - JWT-verified handshakes and heartbeat pings

pub mod channel;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod presence;
pub mod server;

pub use channel::{ChannelHandle, RealtimeChannel};
pub use notification::{DispatchRequest, NotificationDispatcher, NotificationLedger};
pub use presence::{PresenceStore, PresenceTracker};
pub use server::RealtimeEngine;
