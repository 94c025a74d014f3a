//! Presence: connection reference counts mirrored into the user directory.

pub mod memory;
pub mod store;
pub mod tracker;

pub use memory::MemoryPresenceStore;
pub use store::PresenceStore;
pub use tracker::PresenceTracker;
