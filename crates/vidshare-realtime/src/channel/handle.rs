//! Late-bound access to the realtime channel.
//!
//! The dispatcher and presence tracker are built before the socket layer is
//! listening. They hold a [`ChannelHandle`] and resolve it on each use; the
//! server binds the channel once with [`ChannelHandle::init`].

use std::sync::{Arc, OnceLock};

use vidshare_core::error::AppError;

use super::realtime::RealtimeChannel;

/// Shared, initialize-once reference to the [`RealtimeChannel`].
#[derive(Debug, Clone, Default)]
pub struct ChannelHandle {
    inner: Arc<OnceLock<Arc<RealtimeChannel>>>,
}

impl ChannelHandle {
    /// Create an uninitialized handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the channel. Fails if a channel is already bound.
    pub fn init(&self, channel: Arc<RealtimeChannel>) -> Result<(), AppError> {
        self.inner
            .set(channel)
            .map_err(|_| AppError::conflict("Realtime channel already initialized"))
    }

    /// Resolve the bound channel.
    pub fn get(&self) -> Result<Arc<RealtimeChannel>, AppError> {
        self.inner
            .get()
            .cloned()
            .ok_or_else(|| AppError::service_unavailable("Realtime channel not initialized"))
    }

    /// Whether [`Self::init`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.inner.get().is_some()
    }
}
