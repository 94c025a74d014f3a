//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use vidshare_core::types::id::{NotificationId, UserId};
use vidshare_entity::notification::Notification;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Reply to a server ping.
    Pong,
    /// Mark one of the caller's notifications as read.
    MarkRead {
        /// Notification ID.
        #[serde(rename = "notificationId")]
        notification_id: NotificationId,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// A freshly persisted notification for the connected user.
    ReceiveNotification(Notification),
    /// Another user came online or went offline.
    UserStatusChange {
        /// Whose presence changed.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// New state.
        #[serde(rename = "isOnline")]
        is_online: bool,
    },
    /// Server keepalive.
    Ping {
        /// Server time in milliseconds since the epoch.
        timestamp: i64,
    },
    /// A client frame could not be handled.
    Error {
        /// Machine-readable code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Wire name of the event.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ReceiveNotification(_) => "receiveNotification",
            Self::UserStatusChange { .. } => "userStatusChange",
            Self::Ping { .. } => "ping",
            Self::Error { .. } => "error",
        }
    }

    /// Build an error frame.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
