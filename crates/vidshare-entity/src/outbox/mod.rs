//! Notification outbox entities.

pub mod model;

pub use model::{NewOutboxEntry, OutboxEntry};
