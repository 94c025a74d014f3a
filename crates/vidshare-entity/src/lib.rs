//! # vidshare-entity
//!
//! Domain entity models for VidShare. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow` and serialize in camelCase, which is the
//! shape clients see over REST and the realtime channel.

pub mod content;
pub mod notification;
pub mod outbox;
pub mod user;
