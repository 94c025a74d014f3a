//! Integration tests against a live PostgreSQL database.
//!
//! Run with `VIDSHARE__DATABASE__URL=postgres://... cargo test -- --ignored`.

mod action_test;
mod helpers;
mod notification_test;
mod presence_test;
