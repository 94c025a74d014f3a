//! # vidshare-core
//!
//! Core crate for VidShare. Contains configuration schemas, typed
//! identifiers, cursor pagination, and the unified error system.
//!
//! This crate has **no** internal dependencies on other VidShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
