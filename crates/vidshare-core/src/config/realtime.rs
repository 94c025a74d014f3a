//! Real-time channel configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user. The oldest is closed beyond this.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Outbound buffer size per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Heartbeat ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Notification listing settings.
    #[serde(default)]
    pub notifications: NotificationRealtimeConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            notifications: NotificationRealtimeConfig::default(),
        }
    }
}

/// Notification listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRealtimeConfig {
    /// Page size used when the client does not pass `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for NotificationRealtimeConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}
