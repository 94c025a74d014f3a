//! Core type definitions used across the VidShare workspace.

pub mod id;
pub mod pagination;

pub use id::*;
pub use pagination::{Cursor, CursorPage, CursorRequest, PageBounds};
