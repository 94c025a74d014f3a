//! # vidshare-database
//!
//! PostgreSQL connection management and concrete repositories for the
//! user directory, content store, notification ledger and outbox.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
