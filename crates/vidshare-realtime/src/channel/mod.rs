//! The user-keyed realtime channel and its late-bound handle.

pub mod handle;
pub mod realtime;

pub use handle::ChannelHandle;
pub use realtime::{RealtimeChannel, Registration};
