//! Route handlers organized by domain.

pub mod content;
pub mod health;
pub mod notification;
pub mod playlist;
pub mod social;
pub mod ws;
