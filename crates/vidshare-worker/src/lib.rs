//! Background outbox relay for VidShare.
//!
//! Triggering actions enqueue notifications in their own transaction; the
//! relay claims them in batches, hands them to the notification dispatcher
//! and records the outcome. Delivery is at least once; the entry id doubles
//! as the notification id so a repeated delivery stores nothing new.

pub mod relay;
pub mod source;

pub use relay::{OutboxRelay, RelayStats};
pub use source::OutboxSource;
