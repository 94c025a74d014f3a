//! Outbox relay worker configuration.

use serde::{Deserialize, Serialize};

/// Background outbox relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the relay is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between outbox polls when idle.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum entries claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Attempts after which an entry is left dead in the outbox.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Seconds a claimed entry stays invisible to other relays.
    #[serde(default = "default_lease")]
    pub lease_seconds: u64,
    /// Hours a delivered entry is kept before purge.
    #[serde(default = "default_retention")]
    pub retention_hours: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            lease_seconds: default_lease(),
            retention_hours: default_retention(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    1
}

fn default_batch_size() -> u32 {
    50
}

fn default_max_attempts() -> i32 {
    10
}

fn default_lease() -> u64 {
    30
}

fn default_retention() -> u64 {
    72
}
