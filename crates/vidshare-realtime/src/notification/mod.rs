//! Notification dispatch and the ledger it persists into.

pub mod dispatcher;
pub mod ledger;
pub mod memory;

pub use dispatcher::{DispatchRequest, NotificationDispatcher};
pub use ledger::NotificationLedger;
pub use memory::MemoryNotificationLedger;
